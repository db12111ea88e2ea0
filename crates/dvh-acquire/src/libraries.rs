//! Shared library-cache acquisition (spec §4.5, §5).
//!
//! Library artifacts are shared by path-identity across every version under
//! a single cache root. The only shared mutable state in the acquirer is
//! the process-wide in-progress set, guarded by a single mutex and cleared
//! as each download completes, so two workers racing to fetch the same
//! library path collapse onto one download instead of two (spec §9).

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use once_cell::sync::Lazy;

use dvh_core::LibraryDescriptor;
use dvh_util::errors::DvhError;

use crate::download;

static IN_PROGRESS: Lazy<Mutex<HashSet<PathBuf>>> = Lazy::new(|| Mutex::new(HashSet::new()));

/// Ensure every library with an `artifact` entry exists under
/// `library_cache_root`, rejecting `..`-traversal paths.
pub async fn ensure_libraries(
    client: &reqwest::Client,
    library_cache_root: &Path,
    libraries: &[LibraryDescriptor],
) -> Result<(), DvhError> {
    for lib in libraries {
        let Some(artifact) = &lib.artifact else {
            continue;
        };
        if !dvh_util::fs::is_safe_relative_path(&artifact.path) {
            return Err(DvhError::Generic {
                message: format!(
                    "library '{}' declares an unsafe path: {}",
                    lib.name, artifact.path
                ),
            });
        }

        let dest = library_cache_root.join(&artifact.path);
        if dest.is_file() {
            continue;
        }

        if !claim(&dest) {
            // Another worker is already fetching this exact path; the
            // caller doesn't need to wait on it since the artifact is
            // validated on every consult downstream (dedup, not ordering).
            continue;
        }
        let result = download::ensure_file(client, &artifact.url, &dest, Some(&artifact.sha1)).await;
        release(&dest);
        result?;
    }
    Ok(())
}

/// Attempt to claim exclusive responsibility for downloading `path`.
/// Returns `false` if another worker already holds the claim.
fn claim(path: &Path) -> bool {
    let mut set = IN_PROGRESS.lock().expect("in-progress mutex poisoned");
    set.insert(path.to_path_buf())
}

fn release(path: &Path) {
    let mut set = IN_PROGRESS.lock().expect("in-progress mutex poisoned");
    set.remove(path);
}
