//! The client/server mapping superset check (spec §4.6, property P4):
//! every class/member the server side declares must also be present,
//! identically named and mapped, on the client side.

use dvh_util::errors::DvhError;

use crate::mapping::MappingFile;

/// Verify `client` is a superset of `server`. Fails fast on the first class
/// or member that isn't present with matching original/mapped identifiers.
pub fn verify_superset(client: &MappingFile, server: &MappingFile) -> Result<(), DvhError> {
    for (original_class, server_class) in &server.classes {
        let Some(client_class) = client.classes.get(original_class) else {
            return Err(mismatch(format!(
                "class '{original_class}' present in server mapping but absent from client"
            )));
        };
        if client_class.mapped_name != server_class.mapped_name {
            return Err(mismatch(format!(
                "class '{original_class}' maps to '{}' on server but '{}' on client",
                server_class.mapped_name, client_class.mapped_name
            )));
        }

        for (sig, mapped) in &server_class.fields {
            match client_class.fields.get(sig) {
                Some(client_mapped) if client_mapped == mapped => {}
                Some(other) => {
                    return Err(mismatch(format!(
                        "field '{original_class}#{sig}' maps to '{mapped}' on server but '{other}' on client"
                    )));
                }
                None => {
                    return Err(mismatch(format!(
                        "field '{original_class}#{sig}' present on server but absent from client"
                    )));
                }
            }
        }

        for (sig, mapped) in &server_class.methods {
            match client_class.methods.get(sig) {
                Some(client_mapped) if client_mapped == mapped => {}
                Some(other) => {
                    return Err(mismatch(format!(
                        "method '{original_class}#{sig}' maps to '{mapped}' on server but '{other}' on client"
                    )));
                }
                None => {
                    return Err(mismatch(format!(
                        "method '{original_class}#{sig}' present on server but absent from client"
                    )));
                }
            }
        }
    }
    Ok(())
}

fn mismatch(message: String) -> DvhError {
    DvhError::MappingMismatch { message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::parse;

    #[test]
    fn superset_ok_when_client_contains_everything() {
        let server = parse("a.B -> x:\n    int f -> g\n").unwrap();
        let client = parse("a.B -> x:\n    int f -> g\n    void m() -> h\n").unwrap();
        verify_superset(&client, &server).unwrap();
    }

    #[test]
    fn fails_when_class_missing_from_client() {
        let server = parse("a.B -> x:\n    int f -> g\n").unwrap();
        let client = parse("c.D -> y:\n    int f -> g\n").unwrap();
        let err = verify_superset(&client, &server).unwrap_err();
        assert!(matches!(err, DvhError::MappingMismatch { .. }));
    }

    #[test]
    fn fails_when_field_mapped_differently() {
        let server = parse("a.B -> x:\n    int f -> g\n").unwrap();
        let client = parse("a.B -> x:\n    int f -> DIFFERENT\n").unwrap();
        let err = verify_superset(&client, &server).unwrap_err();
        assert!(matches!(err, DvhError::MappingMismatch { .. }));
    }

    #[test]
    fn fails_when_method_missing() {
        let server = parse("a.B -> x:\n    void m() -> h\n").unwrap();
        let client = parse("a.B -> x:\n    int f -> g\n").unwrap();
        let err = verify_superset(&client, &server).unwrap_err();
        assert!(matches!(err, DvhError::MappingMismatch { .. }));
    }
}
