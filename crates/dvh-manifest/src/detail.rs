//! Per-version detail record fetch: each `VersionInfo.manifest_url` points
//! at a `VersionDetail` JSON document.

use dvh_core::VersionDetail;
use dvh_util::errors::DvhError;

pub async fn fetch(client: &reqwest::Client, manifest_url: &str) -> Result<VersionDetail, DvhError> {
    let resp = client
        .get(manifest_url)
        .send()
        .await
        .map_err(|e| DvhError::ManifestUnavailable {
            message: format!("request to {manifest_url} failed: {e}"),
        })?;

    if !resp.status().is_success() {
        return Err(DvhError::ManifestUnavailable {
            message: format!("HTTP {} from {manifest_url}", resp.status()),
        });
    }

    let text = resp
        .text()
        .await
        .map_err(|e| DvhError::ManifestUnavailable {
            message: format!("failed to read {manifest_url}: {e}"),
        })?;

    serde_json::from_str(&text).map_err(|e| DvhError::ManifestUnavailable {
        message: format!("failed to parse version detail at {manifest_url}: {e}"),
    })
}
