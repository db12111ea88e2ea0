//! Manifest resolver (MR): fetches the upstream version catalogue and
//! injects synthetic "unobfuscated" variants (spec §4.2).

pub mod cache;
pub mod catalogue;
pub mod detail;
pub mod unobfuscated;

use dvh_core::{VersionId, VersionInfo};
use dvh_util::errors::DvhError;

/// The resolved catalogue: the full ordered version list plus the
/// catalogue's own `latest` pointers, which branch policy (spec §4.3)
/// falls back on for an unset branch end.
pub struct CatalogueResolution {
    pub versions: Vec<VersionInfo>,
    pub latest_release: VersionId,
    pub latest_snapshot: VersionId,
}

/// Resolve the full, ordered version list: fetch (or reuse a fresh cache
/// of) the catalogue, inject synthetic unobfuscated variants, and sort
/// ascending by release time.
pub async fn resolve(client: &reqwest::Client, cache_root: &std::path::Path) -> Result<CatalogueResolution, DvhError> {
    let body = match cache::read_fresh(cache_root) {
        Some(body) => body,
        None => {
            let doc = catalogue::fetch(client, &catalogue::catalogue_url()).await?;
            let body = serde_json::to_string(&doc).map_err(|e| DvhError::ManifestUnavailable {
                message: format!("failed to re-serialize catalogue for caching: {e}"),
            })?;
            let _ = cache::write(cache_root, &body);
            return finish(doc);
        }
    };
    let doc = catalogue::parse(&body)?;
    finish(doc)
}

fn finish(doc: catalogue::CatalogueDocument) -> Result<CatalogueResolution, DvhError> {
    let latest_release = doc.latest.release.clone();
    let latest_snapshot = doc.latest.snapshot.clone();

    let mut versions = doc.versions.ok_or_else(|| DvhError::ManifestUnavailable {
        message: "catalogue document has no `versions` array".to_string(),
    })?;
    unobfuscated::insert_synthetic_variants(&mut versions);
    catalogue::sort_by_release_time_ascending(&mut versions);
    Ok(CatalogueResolution {
        versions,
        latest_release,
        latest_snapshot,
    })
}
