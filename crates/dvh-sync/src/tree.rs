//! Working-tree enumeration: the starting set `E` of regular files under
//! `src/main` a sync pass reconciles against the decompiled archive (spec
//! §4.9 step 1).

use std::collections::HashSet;
use std::path::Path;

use dvh_util::errors::DvhError;

pub const SRC_MAIN: &str = "src/main";
pub const SRC_MAIN_JAVA: &str = "src/main/java";
pub const SRC_MAIN_RESOURCES: &str = "src/main/resources";

/// Enumerate every regular file under `<working_tree_root>/src/main`,
/// returned as forward-slash paths relative to `working_tree_root`.
pub fn enumerate(working_tree_root: &Path) -> Result<HashSet<String>, DvhError> {
    let root = working_tree_root.join(SRC_MAIN);
    let mut out = HashSet::new();
    if !root.is_dir() {
        return Ok(out);
    }

    for entry in walkdir::WalkDir::new(&root).into_iter() {
        let entry = entry.map_err(|e| DvhError::Io(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(working_tree_root)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .replace('\\', "/");
        out.insert(relative);
    }
    Ok(out)
}

/// Destination path (relative to `working_tree_root`, forward-slash) an
/// archive entry maps to: Java sources under `src/main/java`, everything
/// else under `src/main/resources`.
pub fn destination_for(archive_path: &str) -> String {
    if archive_path.ends_with(".java") {
        format!("{SRC_MAIN_JAVA}/{archive_path}")
    } else {
        format!("{SRC_MAIN_RESOURCES}/{archive_path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn destination_routes_java_and_resources() {
        assert_eq!(
            destination_for("net/minecraft/Main.java"),
            "src/main/java/net/minecraft/Main.java"
        );
        assert_eq!(
            destination_for("assets/lang.json"),
            "src/main/resources/assets/lang.json"
        );
    }

    #[test]
    fn enumerate_collects_nested_files() {
        let tmp = TempDir::new().unwrap();
        let java_dir = tmp.path().join("src/main/java/net/minecraft");
        std::fs::create_dir_all(&java_dir).unwrap();
        std::fs::write(java_dir.join("Main.java"), b"class Main {}").unwrap();

        let found = enumerate(tmp.path()).unwrap();
        assert!(found.contains("src/main/java/net/minecraft/Main.java"));
    }

    #[test]
    fn enumerate_missing_src_main_is_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(enumerate(tmp.path()).unwrap().is_empty());
    }
}
