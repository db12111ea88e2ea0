use std::path::{Path, PathBuf};

/// Walk up from `start` looking for a file named `filename`.
/// Returns the path to the directory containing the file, or `None`.
pub fn find_ancestor_with(start: &Path, filename: &str) -> Option<PathBuf> {
    let mut current = start;
    loop {
        let candidate = current.join(filename);
        if candidate.is_file() {
            return Some(current.to_path_buf());
        }
        current = current.parent()?;
    }
}

/// Ensure a directory exists, creating it and any parents if needed.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Reject a relative artifact path that attempts to escape its root via `..`
/// components. Used to validate library paths pulled from version manifests
/// before joining them onto the shared library cache root.
pub fn is_safe_relative_path(path: &str) -> bool {
    let p = Path::new(path);
    if p.is_absolute() {
        return false;
    }
    !p.components()
        .any(|c| matches!(c, std::path::Component::ParentDir))
}

/// Atomically write `contents` to `path` by writing to a sibling temp file
/// and renaming it into place.
pub fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    ensure_dir(parent)?;
    let tmp = parent.join(format!(
        ".{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "dvh".to_string())
    ));
    std::fs::write(&tmp, contents)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn find_ancestor_with_direct() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("Snowblower.txt"), "").unwrap();
        let result = find_ancestor_with(tmp.path(), "Snowblower.txt");
        assert_eq!(result, Some(tmp.path().to_path_buf()));
    }

    #[test]
    fn find_ancestor_with_nested() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("Snowblower.txt"), "").unwrap();
        let nested = tmp.path().join("a").join("b").join("c");
        std::fs::create_dir_all(&nested).unwrap();
        let result = find_ancestor_with(&nested, "Snowblower.txt");
        assert_eq!(result, Some(tmp.path().to_path_buf()));
    }

    #[test]
    fn find_ancestor_with_not_found() {
        let tmp = TempDir::new().unwrap();
        let result = find_ancestor_with(tmp.path(), "NonExistent.file");
        assert_eq!(result, None);
    }

    #[test]
    fn ensure_dir_creates_nested() {
        let tmp = TempDir::new().unwrap();
        let deep = tmp.path().join("x").join("y").join("z");
        assert!(!deep.exists());
        ensure_dir(&deep).unwrap();
        assert!(deep.is_dir());
    }

    #[test]
    fn rejects_parent_dir_traversal() {
        assert!(!is_safe_relative_path("../../etc/passwd"));
        assert!(!is_safe_relative_path("lib/../../escape.jar"));
    }

    #[test]
    fn rejects_absolute_path() {
        assert!(!is_safe_relative_path("/etc/passwd"));
    }

    #[test]
    fn accepts_normal_relative_path() {
        assert!(is_safe_relative_path("org/example/lib/1.0/lib-1.0.jar"));
    }

    #[test]
    fn write_atomic_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("file.txt");
        write_atomic(&path, b"hello").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"hello");
    }
}
