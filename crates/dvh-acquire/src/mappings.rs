//! Side-mapping acquisition: a sibling "extra mappings" directory is tried
//! first, falling back to upstream (spec §4.5).

use std::path::{Path, PathBuf};

use dvh_core::{DownloadDescriptor, VersionId};
use dvh_util::errors::DvhError;

use crate::download;

/// `<extra_mappings_dir>/<branch_type>/<id>/maps/<side>.txt`.
fn extra_path(extra_mappings_dir: &Path, branch_type: &str, id: &VersionId, side: &str) -> PathBuf {
    extra_mappings_dir
        .join(branch_type)
        .join(id.as_str())
        .join("maps")
        .join(format!("{side}.txt"))
}

/// Ensure `dest` holds the named mapping side, preferring a sibling
/// extra-mappings override over the upstream descriptor.
pub async fn ensure_mapping(
    client: &reqwest::Client,
    extra_mappings_dir: Option<&Path>,
    branch_type: &str,
    id: &VersionId,
    side: &str,
    descriptor: &DownloadDescriptor,
    dest: &Path,
) -> Result<(), DvhError> {
    if dest.is_file() {
        return Ok(());
    }

    if let Some(extra_dir) = extra_mappings_dir {
        let candidate = extra_path(extra_dir, branch_type, id, side);
        if candidate.is_file() {
            let content = std::fs::read(&candidate).map_err(DvhError::Io)?;
            return dvh_util::fs::write_atomic(dest, &content).map_err(DvhError::Io);
        }
    }

    download::ensure_file(client, &descriptor.url, dest, Some(&descriptor.sha1)).await
}
