//! Manifest-level caching (ambient supplement, SPEC_FULL §4.2): the fetched
//! catalogue document is cached under `<cache>/manifest.json` with a short
//! TTL so a resumed run that crashed mid-plan does not refetch the
//! multi-megabyte catalogue on every retry.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use dvh_util::errors::DvhError;

/// How long a cached catalogue document is considered fresh.
pub const TTL: Duration = Duration::from_secs(5 * 60);

fn cache_path(cache_root: &Path) -> PathBuf {
    cache_root.join("manifest.json")
}

/// Read the cached catalogue document body if present and younger than
/// [`TTL`].
pub fn read_fresh(cache_root: &Path) -> Option<String> {
    let path = cache_path(cache_root);
    let metadata = std::fs::metadata(&path).ok()?;
    let modified = metadata.modified().ok()?;
    let age = SystemTime::now().duration_since(modified).ok()?;
    if age > TTL {
        return None;
    }
    std::fs::read_to_string(&path).ok()
}

/// Persist a freshly-fetched catalogue document body.
pub fn write(cache_root: &Path, body: &str) -> Result<(), DvhError> {
    dvh_util::fs::ensure_dir(cache_root).map_err(DvhError::Io)?;
    dvh_util::fs::write_atomic(&cache_path(cache_root), body.as_bytes()).map_err(DvhError::Io)
}
