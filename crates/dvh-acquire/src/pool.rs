//! Bounded concurrent worker pool driving per-version acquisition (spec
//! §4.5, §5), grounded on `kargo_resolver::resolver`'s `tokio::task::JoinSet`
//! fan-out over a fixed concurrency cap.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::task::JoinSet;

use dvh_core::{VersionDetail, VersionInfo};
use dvh_util::errors::DvhError;

use crate::version::acquire_version;

/// Tuning knobs for the acquirer, overridable from [`dvh_core::config::AcquireConfig`].
pub struct AcquireOptions {
    pub workers: usize,
    pub timeout: Duration,
    pub partial_cache: bool,
    pub extra_mappings_dir: Option<PathBuf>,
    pub branch_type: String,
}

impl AcquireOptions {
    pub fn new(partial_cache: bool, branch_type: impl Into<String>) -> Self {
        Self {
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            timeout: Duration::from_secs(10 * 60),
            partial_cache,
            extra_mappings_dir: None,
            branch_type: branch_type.into(),
        }
    }
}

/// One version's worth of already-fetched detail, paired with its raw JSON
/// body (needed verbatim for `version.json`'s SHA-1 check).
pub struct VersionWork {
    pub info: VersionInfo,
    pub detail: VersionDetail,
    pub detail_json: String,
}

/// Run the full acquisition plan: one task per version, capped at
/// `opts.workers` concurrently, the whole drain bounded by `opts.timeout`.
pub async fn acquire_all(
    client: reqwest::Client,
    cache_root: &Path,
    work: Vec<VersionWork>,
) -> Result<(), DvhError> {
    acquire_all_with(client, cache_root, work, &AcquireOptions::new(false, "custom")).await
}

pub async fn acquire_all_with(
    client: reqwest::Client,
    cache_root: &Path,
    work: Vec<VersionWork>,
    opts: &AcquireOptions,
) -> Result<(), DvhError> {
    let library_root = dvh_core::artifact::library_cache_root(cache_root);
    let extra_mappings_dir = opts.extra_mappings_dir.clone();
    let branch_type = opts.branch_type.clone();
    let partial_cache = opts.partial_cache;

    let drain = async {
        let mut set: JoinSet<Result<(), DvhError>> = JoinSet::new();
        let mut pending = work.into_iter();
        let mut in_flight = 0usize;

        loop {
            while in_flight < opts.workers {
                let Some(item) = pending.next() else { break };
                let client = client.clone();
                let cache_root = cache_root.to_path_buf();
                let library_root = library_root.clone();
                let extra_mappings_dir = extra_mappings_dir.clone();
                let branch_type = branch_type.clone();

                set.spawn(async move {
                    let version_dir = dvh_core::artifact::version_cache_dir(
                        &cache_root,
                        item.info.id.as_str(),
                    );
                    acquire_version(
                        &client,
                        &version_dir,
                        &library_root,
                        extra_mappings_dir.as_deref(),
                        &branch_type,
                        &item.info,
                        &item.detail,
                        &item.detail_json,
                        partial_cache,
                    )
                    .await
                });
                in_flight += 1;
            }

            let Some(result) = set.join_next().await else {
                break;
            };
            in_flight -= 1;
            result
                .map_err(|e| DvhError::Generic {
                    message: format!("acquisition task panicked: {e}"),
                })??;
        }
        Ok::<(), DvhError>(())
    };

    match tokio::time::timeout(opts.timeout, drain).await {
        Ok(result) => result,
        Err(_) => Err(DvhError::Generic {
            message: format!(
                "artifact acquisition did not complete within {:?}",
                opts.timeout
            ),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_use_logical_parallelism() {
        let opts = AcquireOptions::new(false, "release");
        assert!(opts.workers >= 1);
        assert_eq!(opts.timeout, Duration::from_secs(600));
    }

    #[tokio::test]
    async fn empty_work_completes_immediately() {
        let tmp = tempfile::TempDir::new().unwrap();
        let client = crate::client::build_client().unwrap();
        acquire_all(client, tmp.path(), Vec::new()).await.unwrap();
    }
}
