//! Merge-remap engine (MRE): combines client and server jars into a single
//! remapped `joined.jar`, short-circuited by a content-addressed fingerprint
//! (spec §4.7).

pub mod extract;

use std::path::{Path, PathBuf};

use dvh_core::ArtifactNames;
use dvh_fingerprint::FingerprintKey;
use dvh_mapping::MappingFile;
use dvh_util::errors::DvhError;

/// Everything the merge-remap stage needs about one version's artifacts.
///
/// `mappings` is the already-merged, superset-verified mapping ([`dvh_mapping`]'s
/// `ME` output, obf-keyed) — `None` for unobfuscated versions or when either
/// side mapping was absent upstream.
pub struct MergeInputs<'a> {
    pub version_dir: &'a Path,
    pub client_jar: &'a Path,
    pub server_jar: &'a Path,
    pub client_sha1: &'a str,
    pub server_sha1: &'a str,
    pub is_unobfuscated: bool,
    pub mappings: Option<&'a MappingFile>,
    pub partial_cache: bool,
}

/// Run the merge-remap stage, writing `joined.jar` under `version_dir`
/// unless a valid fingerprint shows the prior run's output is still good.
pub fn run(inputs: &MergeInputs) -> Result<PathBuf, DvhError> {
    let joined_jar = inputs.version_dir.join(ArtifactNames::JOINED_JAR);
    let cache_file = inputs
        .version_dir
        .join(ArtifactNames::cache_sidecar(ArtifactNames::JOINED_JAR));
    let server_extracted = inputs.version_dir.join(ArtifactNames::SERVER_EXTRACTED_JAR);
    let merged_mappings_path = inputs.version_dir.join(ArtifactNames::MERGED_MAPPINGS);

    let merged_text = inputs.mappings.map(dvh_mapping::tsrg2::write);

    let mut key = FingerprintKey::new();
    key.put_dependency("merge-tool", dvh_toolchain::dependency_hashes::MERGE_TOOL);
    key.put_dependency("remap-tool", dvh_toolchain::dependency_hashes::REMAP_TOOL);
    key.put_hash("client-sha1", inputs.client_sha1);
    key.put_hash("server-sha1", inputs.server_sha1);
    if let Some(text) = &merged_text {
        key.put_hash("mappings", dvh_util::hash::sha1_bytes(text.as_bytes()));
    }

    if joined_jar.is_file()
        && key
            .is_valid(&cache_file, None, &dvh_toolchain::dependency_hashes::lookup)
            .unwrap_or(false)
    {
        return Ok(joined_jar);
    }

    if let Some(text) = &merged_text {
        dvh_util::fs::write_atomic(&merged_mappings_path, text.as_bytes()).map_err(DvhError::Io)?;
    }

    let server_for_merge = prepare_server_side(inputs, &server_extracted)?;
    if server_for_merge == server_extracted {
        key.put_path("server-extracted", &server_extracted);
    }

    let result = if inputs.is_unobfuscated {
        dvh_toolchain::remap::remap(
            inputs.client_jar,
            &joined_jar,
            None,
            Some(&server_for_merge),
            true,
            false,
        )
        .map_err(|e| to_dvh_error(e, "remap"))
    } else {
        merge_and_remap(
            inputs,
            &server_for_merge,
            merged_text.is_some().then_some(merged_mappings_path.as_path()),
            &joined_jar,
        )
    };

    result?;

    key.write(&cache_file, &dvh_toolchain::dependency_hashes::lookup)?;

    if inputs.partial_cache {
        for artifact in [inputs.client_jar, inputs.server_jar, server_extracted.as_path()] {
            if artifact.is_file() {
                let _ = std::fs::remove_file(artifact);
            }
        }
    }

    Ok(joined_jar)
}

/// Spec §4.7 step 1: decide whether `server.jar` needs bundler extraction,
/// mapped-class trimming, or can be used verbatim, returning the path that
/// should stand in for "the server side" downstream.
fn prepare_server_side(inputs: &MergeInputs, server_extracted: &Path) -> Result<PathBuf, DvhError> {
    if dvh_toolchain::bundler::is_bundler(inputs.server_jar)? {
        dvh_toolchain::bundler::extract(inputs.server_jar, server_extracted)
            .map_err(|e| to_dvh_error(e, "bundler-extract"))?;
        return Ok(server_extracted.to_path_buf());
    }

    let Some(mapping) = inputs.mappings else {
        return Ok(inputs.server_jar.to_path_buf());
    };

    extract::extract_mapped_classes(inputs.server_jar, mapping, server_extracted)?;
    Ok(server_extracted.to_path_buf())
}

/// Spec §4.7 step 3: side-merge client+server into a joined obfuscated
/// archive, then remap it, deleting the obfuscated intermediate regardless
/// of outcome.
fn merge_and_remap(
    inputs: &MergeInputs,
    server_side: &Path,
    merged_mappings_path: Option<&Path>,
    joined_jar: &Path,
) -> Result<(), DvhError> {
    let joined_obf = inputs.version_dir.join("joined-obf.jar");

    let merge_result = dvh_toolchain::merge::merge(inputs.client_jar, server_side, &joined_obf)
        .map_err(|e| to_dvh_error(e, "merge"));

    let remap_result = merge_result.and_then(|_| {
        dvh_toolchain::remap::remap(&joined_obf, joined_jar, merged_mappings_path, None, false, true)
            .map_err(|e| to_dvh_error(e, "remap"))
    });

    if joined_obf.is_file() {
        let _ = std::fs::remove_file(&joined_obf);
    }

    remap_result
}

fn to_dvh_error(err: miette::Report, tool: &str) -> DvhError {
    DvhError::ToolFailure {
        tool: tool.to_string(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn write_jar(path: &Path, entries: &[(&str, &[u8])]) {
        let file = std::fs::File::create(path).unwrap();
        let mut zip = ZipWriter::new(file);
        for (name, content) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(content).unwrap();
        }
        zip.finish().unwrap();
    }

    fn mapping_with_classes(names: &[&str]) -> MappingFile {
        let mut classes = IndexMap::new();
        for name in names {
            classes.insert(
                name.to_string(),
                dvh_mapping::ClassMapping {
                    mapped_name: format!("mapped.{name}"),
                    fields: IndexMap::new(),
                    methods: IndexMap::new(),
                },
            );
        }
        MappingFile { classes }
    }

    #[test]
    fn prepare_server_side_passes_through_without_mappings() {
        let tmp = TempDir::new().unwrap();
        let server = tmp.path().join("server.jar");
        write_jar(&server, &[("a/B.class", b"x")]);

        let inputs = MergeInputs {
            version_dir: tmp.path(),
            client_jar: &tmp.path().join("client.jar"),
            server_jar: &server,
            client_sha1: &"a".repeat(40),
            server_sha1: &"b".repeat(40),
            is_unobfuscated: true,
            mappings: None,
            partial_cache: false,
        };

        let result = prepare_server_side(&inputs, &tmp.path().join("server-extracted.jar")).unwrap();
        assert_eq!(result, server);
    }

    #[test]
    fn prepare_server_side_extracts_with_mappings() {
        let tmp = TempDir::new().unwrap();
        let server = tmp.path().join("server.jar");
        write_jar(&server, &[("a/B.class", b"x"), ("shaded/C.class", b"y")]);

        let mapping = mapping_with_classes(&["a.B"]);
        let inputs = MergeInputs {
            version_dir: tmp.path(),
            client_jar: &tmp.path().join("client.jar"),
            server_jar: &server,
            client_sha1: &"a".repeat(40),
            server_sha1: &"b".repeat(40),
            is_unobfuscated: false,
            mappings: Some(&mapping),
            partial_cache: false,
        };

        let extracted = tmp.path().join("server-extracted.jar");
        let result = prepare_server_side(&inputs, &extracted).unwrap();
        assert_eq!(result, extracted);
        assert!(extracted.is_file());
    }
}
