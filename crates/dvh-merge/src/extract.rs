//! Server-archive trimming for obfuscated versions (spec §4.7 step 1b):
//! copy into a new archive only entries whose class name appears in the
//! obfuscated mapping side, stripping shaded libraries and resources —
//! the client is assumed to hold an equivalent copy of any shared resource.

use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use dvh_mapping::MappingFile;
use dvh_util::errors::DvhError;

/// Convert a zip entry path (`a/b/C.class`) to the class name it would
/// appear under in a mapping file (`a.b.C`).
fn entry_to_class_name(entry_name: &str) -> Option<String> {
    let without_suffix = entry_name.strip_suffix(".class")?;
    Some(without_suffix.replace('/', "."))
}

/// Write `output_jar` containing only the `.class` entries of `server_jar`
/// whose class name is a key in `obfuscated_mapping`.
pub fn extract_mapped_classes(
    server_jar: &Path,
    obfuscated_mapping: &MappingFile,
    output_jar: &Path,
) -> Result<(), DvhError> {
    let known: HashSet<&str> = obfuscated_mapping.classes.keys().map(String::as_str).collect();

    let input = File::open(server_jar).map_err(DvhError::Io)?;
    let mut archive = ZipArchive::new(input).map_err(|e| DvhError::Generic {
        message: format!("failed to open {}: {e}", server_jar.display()),
    })?;

    if let Some(parent) = output_jar.parent() {
        dvh_util::fs::ensure_dir(parent).map_err(DvhError::Io)?;
    }
    let output = File::create(output_jar).map_err(DvhError::Io)?;
    let mut writer = ZipWriter::new(output);
    let options = SimpleFileOptions::default();

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| DvhError::Generic {
            message: format!("failed to read zip entry {i} of {}: {e}", server_jar.display()),
        })?;
        let name = entry.name().to_string();

        let Some(class_name) = entry_to_class_name(&name) else {
            continue; // resource entries are dropped; the client owns them
        };
        if !known.contains(class_name.as_str()) {
            continue;
        }

        let mut buf = Vec::new();
        entry.read_to_end(&mut buf).map_err(DvhError::Io)?;
        writer
            .start_file(name, options)
            .map_err(|e| DvhError::Generic {
                message: format!("failed to start zip entry: {e}"),
            })?;
        writer.write_all(&buf).map_err(DvhError::Io)?;
    }

    writer.finish().map_err(|e| DvhError::Generic {
        message: format!("failed to finalize {}: {e}", output_jar.display()),
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use std::io::Write as _;
    use tempfile::TempDir;

    fn write_jar(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
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
    fn keeps_only_mapped_classes() {
        let tmp = TempDir::new().unwrap();
        let server_jar = tmp.path().join("server.jar");
        write_jar(
            &server_jar,
            &[
                ("a/B.class", b"classbytes"),
                ("shaded/lib/C.class", b"shadedbytes"),
                ("data/resource.json", b"{}"),
            ],
        );

        let mapping = mapping_with_classes(&["a.B"]);
        let output = tmp.path().join("server-extracted.jar");
        extract_mapped_classes(&server_jar, &mapping, &output).unwrap();

        let file = File::open(&output).unwrap();
        let mut archive = ZipArchive::new(file).unwrap();
        assert_eq!(archive.len(), 1);
        assert!(archive.by_name("a/B.class").is_ok());
    }

    #[test]
    fn entry_to_class_name_conversion() {
        assert_eq!(entry_to_class_name("a/b/C.class").as_deref(), Some("a.b.C"));
        assert_eq!(entry_to_class_name("resource.json"), None);
    }
}
