//! The upstream version catalogue wire shape and its fetch.

use dvh_core::{VersionId, VersionInfo};
use dvh_util::errors::DvhError;
use serde::{Deserialize, Serialize};

/// `{latest: {release, snapshot}, versions: [VersionInfo]}`, the raw
/// catalogue descriptor shape (spec §4.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogueDocument {
    pub latest: LatestPointers,
    pub versions: Option<Vec<VersionInfo>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatestPointers {
    pub release: VersionId,
    pub snapshot: VersionId,
}

const DEFAULT_CATALOGUE_URL: &str =
    "https://piston-meta.mojang.com/mc/game/version_manifest_v2.json";

/// The catalogue root URL, overridable for tests/mirrors via
/// `DVH_CATALOGUE_URL`.
pub fn catalogue_url() -> String {
    std::env::var("DVH_CATALOGUE_URL").unwrap_or_else(|_| DEFAULT_CATALOGUE_URL.to_string())
}

/// Fetch and parse the catalogue document over the network.
///
/// Fails with [`DvhError::ManifestUnavailable`] if the request fails or the
/// response has no `versions` array (spec §4.2).
pub async fn fetch(client: &reqwest::Client, url: &str) -> Result<CatalogueDocument, DvhError> {
    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| DvhError::ManifestUnavailable {
            message: format!("request to {url} failed: {e}"),
        })?;

    if !resp.status().is_success() {
        return Err(DvhError::ManifestUnavailable {
            message: format!("HTTP {} from {url}", resp.status()),
        });
    }

    let text = resp
        .text()
        .await
        .map_err(|e| DvhError::ManifestUnavailable {
            message: format!("failed to read response body from {url}: {e}"),
        })?;

    parse(&text)
}

/// Parse an already-fetched catalogue document body.
pub fn parse(text: &str) -> Result<CatalogueDocument, DvhError> {
    let doc: CatalogueDocument =
        serde_json::from_str(text).map_err(|e| DvhError::ManifestUnavailable {
            message: format!("failed to parse catalogue document: {e}"),
        })?;
    if doc.versions.is_none() {
        return Err(DvhError::ManifestUnavailable {
            message: "catalogue document has no `versions` array".to_string(),
        });
    }
    Ok(doc)
}

/// Sort `versions` ascending by release time, breaking ties by `priority`
/// so a synthetic unobfuscated variant (inserted with a strictly greater
/// priority than its base) sorts after its base even when release times
/// are identical.
pub fn sort_by_release_time_ascending(versions: &mut [VersionInfo]) {
    versions.sort_by(|a, b| {
        a.time_released
            .cmp(&b.time_released)
            .then(a.priority.cmp(&b.priority))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_missing_versions() {
        let json = r#"{"latest": {"release": "1.20.1", "snapshot": "23w45a"}}"#;
        let err = parse(json).unwrap_err();
        assert!(matches!(err, DvhError::ManifestUnavailable { .. }));
    }

    #[test]
    fn parse_rejects_malformed_json() {
        let err = parse("not json").unwrap_err();
        assert!(matches!(err, DvhError::ManifestUnavailable { .. }));
    }

    #[test]
    fn parse_accepts_well_formed_document() {
        let json = r#"{
            "latest": {"release": "1.20.1", "snapshot": "23w45a"},
            "versions": []
        }"#;
        let doc = parse(json).unwrap();
        assert_eq!(doc.latest.release.as_str(), "1.20.1");
        assert!(doc.versions.unwrap().is_empty());
    }
}
