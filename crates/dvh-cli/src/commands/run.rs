//! Builds a [`dvh_pipeline::PipelineConfig`] from CLI flags (layered over
//! `~/.dvh/config.toml` and any `--cfg` branch config files) and drives the
//! pipeline once to completion.

use dvh_core::branch::{BranchSpec, BranchType};
use dvh_core::branch_config::{self, BranchConfigFile};
use dvh_core::config::GlobalConfig;
use dvh_core::version::VersionId;
use dvh_util::errors::DvhError;
use dvh_util::progress;

use crate::cli::Cli;

pub async fn exec(cli: Cli) -> Result<(), DvhError> {
    let global = GlobalConfig::load().map_err(|e| DvhError::Generic {
        message: format!("failed to load global config: {e}"),
    })?;

    let committer = global.committer.clone().unwrap_or_else(dvh_core::Identity::default_committer);

    let branch_spec = resolve_branch_spec(&cli).await?;

    // `--cache` carries clap's own default (`./cache`); only fall back to the
    // global config's cache dir when the flag is still at that default,
    // since the global file exists precisely to avoid repeating it per run.
    let default_cache = std::path::Path::new("./cache");
    let cache = if cli.cache == default_cache && global.cache.dir != "./cache" {
        std::path::PathBuf::from(&global.cache.dir)
    } else {
        cli.cache.clone()
    };

    progress::status_info("Planning", &format!("branch '{}' over cache '{}'", cli.branch, cache.display()));

    let config = dvh_pipeline::PipelineConfig {
        output: cli.output.clone(),
        cache,
        extra_mappings: cli.extra_mappings.clone(),
        branch_name: cli.branch.clone(),
        branch_spec,
        remote_url: cli.remote.clone(),
        checkout: cli.checkout,
        push: cli.push,
        start_over: cli.start_over,
        start_over_if_required: cli.start_over_if_required,
        partial_cache: cli.partial_cache,
        include: cli.include.clone(),
        exclude: cli.exclude.clone(),
        committer,
    };

    dvh_pipeline::run(config).await?;
    progress::status("Finished", "pipeline run complete");
    Ok(())
}

/// Resolve the effective [`BranchSpec`] for `cli.branch`: start from any
/// `--cfg`-supplied spec for that branch name, falling back to a bare spec
/// built from `--releases-only`, then let `--start-ver`/`--target-ver`
/// override whatever the config file declared — CLI flags are the most
/// proximate statement of operator intent and win over a stored config.
async fn resolve_branch_spec(cli: &Cli) -> Result<BranchSpec, DvhError> {
    let mut composed = std::collections::BTreeMap::new();
    for uri in &cli.cfg {
        let body = fetch_cfg(uri).await?;
        let file = BranchConfigFile::parse(&body).map_err(|e| DvhError::ArgumentError {
            message: format!("failed to parse branch config '{uri}': {e}"),
        })?;
        composed = branch_config::compose([
            BranchConfigFile { branches: composed },
            file,
        ]);
    }

    let mut spec = composed.remove(&cli.branch).unwrap_or_else(|| {
        BranchSpec::new(if cli.releases_only {
            BranchType::Release
        } else {
            BranchType::Custom
        })
    });

    if cli.releases_only {
        spec.branch_type = BranchType::Release;
    }
    if let Some(start) = &cli.start_ver {
        spec.start = Some(VersionId::new(start.clone()));
    }
    if cli.target_ver != "latest" {
        spec.end = Some(VersionId::new(cli.target_ver.clone()));
    }

    Ok(spec)
}

async fn fetch_cfg(uri: &str) -> Result<String, DvhError> {
    if let Some(path) = uri.strip_prefix("file://") {
        std::fs::read_to_string(path).map_err(|e| DvhError::ArgumentError {
            message: format!("failed to read branch config '{uri}': {e}"),
        })
    } else if uri.starts_with("https://") {
        let resp = reqwest::get(uri).await.map_err(|e| DvhError::Network {
            message: format!("failed to fetch branch config '{uri}': {e}"),
        })?;
        resp.text().await.map_err(|e| DvhError::Network {
            message: format!("failed to read branch config '{uri}': {e}"),
        })
    } else {
        Err(DvhError::ArgumentError {
            message: format!("unsupported --cfg URI scheme: '{uri}' (expected file:// or https://)"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[tokio::test]
    async fn no_cfg_builds_custom_spec_from_flags() {
        let cli = Cli::parse_from(["dvh", "--output", "./out", "--start-ver", "1.14.4"]);
        let spec = resolve_branch_spec(&cli).await.unwrap();
        assert_eq!(spec.branch_type, BranchType::Custom);
        assert_eq!(spec.start.unwrap().as_str(), "1.14.4");
    }

    #[tokio::test]
    async fn releases_only_forces_release_type() {
        let cli = Cli::parse_from(["dvh", "--output", "./out", "--releases-only"]);
        let spec = resolve_branch_spec(&cli).await.unwrap();
        assert_eq!(spec.branch_type, BranchType::Release);
    }

    #[tokio::test]
    async fn cfg_file_spec_is_overridden_by_explicit_target_ver() {
        let tmp = tempfile::TempDir::new().unwrap();
        let cfg_path = tmp.path().join("branches.json");
        std::fs::write(
            &cfg_path,
            r#"{"branches": {"main": {"type": "release", "start": "1.14.4", "end": "1.15"}}}"#,
        )
        .unwrap();
        let uri = format!("file://{}", cfg_path.display());
        let cli = Cli::parse_from(["dvh", "--output", "./out", "--cfg", &uri, "--target-ver", "1.16"]);
        let spec = resolve_branch_spec(&cli).await.unwrap();
        assert_eq!(spec.start.unwrap().as_str(), "1.14.4");
        assert_eq!(spec.end.unwrap().as_str(), "1.16");
    }

    #[tokio::test]
    async fn unsupported_cfg_scheme_is_argument_error() {
        let cli = Cli::parse_from(["dvh", "--output", "./out", "--cfg", "ftp://example/cfg.json"]);
        let err = resolve_branch_spec(&cli).await.unwrap_err();
        assert!(matches!(err, DvhError::ArgumentError { .. }));
    }
}
