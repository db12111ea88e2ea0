//! Library-classpath config file writer: one `-e=<path>` line per shared
//! library jar, generalizing `kargo_compiler::classpath::to_classpath_string`'s
//! single joined-string form to the decompiler's one-path-per-line config
//! format (spec §4.8).

use std::path::{Path, PathBuf};

use dvh_util::errors::DvhError;

/// Recursively collect every regular file under `library_cache_root`, sorted
/// for deterministic ordering across runs.
pub fn enumerate_libraries(library_cache_root: &Path) -> Result<Vec<PathBuf>, DvhError> {
    let mut files = Vec::new();
    if library_cache_root.is_dir() {
        walk(library_cache_root, &mut files)?;
    }
    files.sort();
    Ok(files)
}

fn walk(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), DvhError> {
    for entry in std::fs::read_dir(dir).map_err(DvhError::Io)? {
        let entry = entry.map_err(DvhError::Io)?;
        let path = entry.path();
        if path.is_dir() {
            walk(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

/// Write the library-classpath config file: one `-e=<path>` line per entry.
pub fn write_config(libraries: &[PathBuf], config_path: &Path) -> Result<(), DvhError> {
    let mut text = String::new();
    for lib in libraries {
        text.push_str("-e=");
        text.push_str(&lib.to_string_lossy());
        text.push('\n');
    }
    dvh_util::fs::write_atomic(config_path, text.as_bytes()).map_err(DvhError::Io)
}
