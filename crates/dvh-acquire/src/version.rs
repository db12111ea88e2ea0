//! Per-version artifact acquisition: the unit of work a single worker
//! performs (spec §4.5).

use std::path::Path;

use dvh_core::{ArtifactNames, DownloadKind, VersionDetail, VersionInfo};
use dvh_util::errors::DvhError;

use crate::{download, libraries, mappings};

/// Ensure every artifact a single version's detail record describes is
/// present under `version_dir`, sharing libraries under `library_cache_root`.
pub async fn acquire_version(
    client: &reqwest::Client,
    version_dir: &Path,
    library_cache_root: &Path,
    extra_mappings_dir: Option<&Path>,
    branch_type: &str,
    info: &VersionInfo,
    detail: &VersionDetail,
    detail_json: &str,
    partial_cache: bool,
) -> Result<(), DvhError> {
    dvh_util::fs::ensure_dir(version_dir).map_err(DvhError::Io)?;

    let version_json = version_dir.join(ArtifactNames::VERSION_JSON);
    if !version_json.is_file()
        || info
            .manifest_hash
            .as_deref()
            .map(|expected| {
                dvh_util::hash::sha1_file(&version_json)
                    .map(|actual| !actual.eq_ignore_ascii_case(expected))
                    .unwrap_or(true)
            })
            .unwrap_or(false)
    {
        dvh_util::fs::write_atomic(&version_json, detail_json.as_bytes()).map_err(DvhError::Io)?;
    }

    if detail.has_mappings() {
        let client_mappings = version_dir.join(ArtifactNames::CLIENT_MAPPINGS);
        let server_mappings = version_dir.join(ArtifactNames::SERVER_MAPPINGS);
        let client_descriptor = detail.download(DownloadKind::ClientMappings).expect("checked above");
        let server_descriptor = detail.download(DownloadKind::ServerMappings).expect("checked above");

        mappings::ensure_mapping(
            client,
            extra_mappings_dir,
            branch_type,
            &info.id,
            "client",
            client_descriptor,
            &client_mappings,
        )
        .await?;
        mappings::ensure_mapping(
            client,
            extra_mappings_dir,
            branch_type,
            &info.id,
            "server",
            server_descriptor,
            &server_mappings,
        )
        .await?;
    }

    libraries::ensure_libraries(client, library_cache_root, &detail.libraries).await?;

    if !partial_cache {
        if let Some(d) = detail.download(DownloadKind::Client) {
            let dest = version_dir.join(ArtifactNames::CLIENT_JAR);
            download::ensure_file(client, &d.url, &dest, Some(&d.sha1)).await?;
        }
        if let Some(d) = detail.download(DownloadKind::Server) {
            let dest = version_dir.join(ArtifactNames::SERVER_JAR);
            download::ensure_file(client, &d.url, &dest, Some(&d.sha1)).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use dvh_core::{LibraryDescriptor, VersionId, VersionKind};
    use std::collections::BTreeMap;

    fn sample_info() -> VersionInfo {
        VersionInfo {
            id: VersionId::new("1.20.1"),
            kind: VersionKind::Release,
            manifest_url: "https://x/1.20.1.json".to_string(),
            time_created: Utc::now(),
            time_released: Utc::now(),
            manifest_hash: None,
            priority: 0,
        }
    }

    #[tokio::test]
    async fn writes_version_json_when_absent() {
        let tmp = tempfile::TempDir::new().unwrap();
        let lib_root = tmp.path().join("libraries");
        let client = crate::client::build_client().unwrap();

        let detail = VersionDetail {
            downloads: BTreeMap::new(),
            libraries: Vec::new(),
            is_unobfuscated: true,
        };
        acquire_version(
            &client,
            &tmp.path().join("1.20.1"),
            &lib_root,
            None,
            "release",
            &sample_info(),
            &detail,
            "{}",
            true,
        )
        .await
        .unwrap();

        assert!(tmp.path().join("1.20.1").join("version.json").is_file());
    }

    #[tokio::test]
    async fn skips_library_with_no_artifact() {
        let tmp = tempfile::TempDir::new().unwrap();
        let lib_root = tmp.path().join("libraries");
        let client = crate::client::build_client().unwrap();

        let detail = VersionDetail {
            downloads: BTreeMap::new(),
            libraries: vec![LibraryDescriptor {
                name: "native:only".to_string(),
                artifact: None,
            }],
            is_unobfuscated: true,
        };

        acquire_version(
            &client,
            &tmp.path().join("1.20.1"),
            &lib_root,
            None,
            "release",
            &sample_info(),
            &detail,
            "{}",
            true,
        )
        .await
        .unwrap();
    }
}
