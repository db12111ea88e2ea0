//! Mapping engine (ME): parses, reverses, and merges client/server name
//! mappings with a superset check (spec §4.6).

pub mod mapping;
pub mod superset;
pub mod tsrg2;

pub use mapping::{parse, ClassMapping, MappingFile};

use dvh_util::errors::DvhError;

/// Parse both sides, verify the client is a superset of the server, reverse
/// the verified mapping into the canonical deobf -> obf direction (spec
/// §4.6), and return it serialized as TSRG2 text (`moj_to_obf.tsrg`).
///
/// Returns `Ok(None)` when either side mapping is absent — spec §4.6's
/// "obfuscated but one or both side mappings are absent" skip condition,
/// which callers surface as the non-fatal `MappingMissing` §7 error kind
/// rather than propagating an error from here.
pub fn merge(client_text: Option<&str>, server_text: Option<&str>) -> Result<Option<String>, DvhError> {
    let (client_text, server_text) = match (client_text, server_text) {
        (Some(c), Some(s)) => (c, s),
        _ => return Ok(None),
    };

    let client = mapping::parse(client_text)?;
    let server = mapping::parse(server_text)?;

    // The superset check compares original/mapped identifiers as parsed
    // (spec §4.6, P4); reversal happens only for the write-out below.
    superset::verify_superset(&client, &server)?;

    Ok(Some(tsrg2::write(&client.reversed())))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLIENT: &str = "a.B -> x:\n    int f -> g\n    void m() -> h\n";
    const SERVER: &str = "a.B -> x:\n    int f -> g\n";

    #[test]
    fn merges_when_both_sides_present_and_consistent() {
        let merged = merge(Some(CLIENT), Some(SERVER)).unwrap();
        assert!(merged.is_some());
        // Written in the reversed (deobf -> obf) direction: class key is
        // the mapped name, value is the original obfuscated name.
        assert!(merged.unwrap().contains("x a.B"));
    }

    #[test]
    fn returns_none_when_server_mapping_absent() {
        assert!(merge(Some(CLIENT), None).unwrap().is_none());
    }

    #[test]
    fn returns_none_when_client_mapping_absent() {
        assert!(merge(None, Some(SERVER)).unwrap().is_none());
    }

    #[test]
    fn propagates_superset_mismatch() {
        let server_extra = "a.B -> x:\n    int f -> g\n    void m() -> h\n    void extra() -> q\n";
        let err = merge(Some(CLIENT), Some(server_extra)).unwrap_err();
        assert!(matches!(err, DvhError::MappingMismatch { .. }));
    }
}
