//! SHA-1 hashing. Every content hash in the fingerprint cache, the manifest's
//! declared download checksums, and the working-tree syncer's content
//! comparison is a 40-char lowercase hex SHA-1 digest.

use sha1::{Digest, Sha1};
use std::io::Read;
use std::path::Path;

/// Compute the SHA-1 hash of a file, streaming it in 64KiB chunks so the
/// whole file is never held in memory at once.
pub fn sha1_file(path: &Path) -> std::io::Result<String> {
    let file = std::fs::File::open(path)?;
    let mut reader = std::io::BufReader::with_capacity(64 * 1024, file);
    let mut hasher = Sha1::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Compute the SHA-1 hash of a byte slice, returning a lowercase hex string.
pub fn sha1_bytes(data: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Compute the SHA-1 hash of a `Read`er without buffering the whole stream.
pub fn sha1_reader<R: Read>(mut reader: R) -> std::io::Result<String> {
    let mut hasher = Sha1::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// True if `s` looks like a 40-char lowercase hex SHA-1 digest.
pub fn looks_like_sha1(s: &str) -> bool {
    s.len() == 40 && s.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn sha1_bytes_empty() {
        assert_eq!(sha1_bytes(b""), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
    }

    #[test]
    fn sha1_bytes_hello() {
        assert_eq!(sha1_bytes(b"hello"), "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d");
    }

    #[test]
    fn sha1_file_matches_bytes() {
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(b"hello").unwrap();
        tmp.flush().unwrap();
        assert_eq!(sha1_file(tmp.path()).unwrap(), sha1_bytes(b"hello"));
    }

    #[test]
    fn sha1_file_not_found() {
        assert!(sha1_file(Path::new("/nonexistent/path/file.txt")).is_err());
    }

    #[test]
    fn looks_like_sha1_valid() {
        assert!(looks_like_sha1("da39a3ee5e6b4b0d3255bfef95601890afd80709"));
    }

    #[test]
    fn looks_like_sha1_rejects_wrong_length() {
        assert!(!looks_like_sha1("abc123"));
    }

    #[test]
    fn looks_like_sha1_rejects_non_hex() {
        assert!(!looks_like_sha1("zz39a3ee5e6b4b0d3255bfef95601890afd80709"));
    }
}
