//! The driving loop: sequences MR → BP → RP → AA → (ME → MRE → DD) → WTS →
//! RD for a single invocation, one version fully committed before the next
//! begins (spec §5).

pub mod resume;

use std::path::PathBuf;

use dvh_core::{ArtifactNames, BranchSpec, BranchType, DownloadKind, Identity, VersionDetail, VersionId, VersionInfo};
use dvh_util::errors::DvhError;

/// Everything a single pipeline run needs, mirroring the CLI flags of
/// spec §6.
pub struct PipelineConfig {
    pub output: PathBuf,
    pub cache: PathBuf,
    pub extra_mappings: Option<PathBuf>,
    pub branch_name: String,
    pub branch_spec: BranchSpec,
    pub remote_url: Option<String>,
    pub checkout: bool,
    pub push: bool,
    pub start_over: bool,
    pub start_over_if_required: bool,
    pub partial_cache: bool,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub committer: Identity,
}

/// Run the whole pipeline once: resolve the catalogue, derive the plan,
/// configure the branch, resume where the last run left off, and drive
/// every remaining version through acquisition, merge/remap, decompile,
/// sync, and commit.
pub async fn run(config: PipelineConfig) -> Result<(), DvhError> {
    let client = dvh_acquire::build_client()?;
    let resolution = dvh_manifest::resolve(&client, &config.cache).await?;
    let repo = dvh_repo::open_or_init(&config.output)?;

    let remote = match &config.remote_url {
        Some(url) => {
            let (name, added) = dvh_repo::remote::provision(&repo, url)?;
            dvh_repo::remote::fetch(&repo, &name)?;
            Some((name, added))
        }
        None => None,
    };
    let remote_name = remote.as_ref().map(|(name, _)| name.as_str());

    let result = run_inner(&config, &client, &repo, remote_name, &resolution).await;

    if let Some((name, true)) = &remote {
        if let Err(e) = dvh_repo::remote::remove(&repo, name) {
            tracing::warn!("failed to remove provisioned remote '{name}': {e}");
        }
    }

    result
}

async fn run_inner(
    config: &PipelineConfig,
    client: &reqwest::Client,
    repo: &git2::Repository,
    remote_name: Option<&str>,
    resolution: &dvh_manifest::CatalogueResolution,
) -> Result<(), DvhError> {
    let plan = dvh_branch::apply(
        &resolution.versions,
        &config.branch_spec,
        &resolution.latest_release,
        &resolution.latest_snapshot,
    )?;
    let to_generate = dvh_branch::plan_range(&plan.filtered, &plan.start, &plan.end)?;

    let current_branch = repo.head().ok().and_then(|h| h.shorthand().map(str::to_string));
    let metadata_compatible =
        dvh_repo::branch::validate_branch_metadata(repo, &config.branch_name, plan.start.as_str())?;
    if !metadata_compatible && !config.start_over_if_required {
        return Err(DvhError::MetadataMismatch {
            message: format!(
                "branch '{}' metadata is incompatible with start version '{}'",
                config.branch_name,
                plan.start.as_str()
            ),
        });
    }

    let configure_request = dvh_repo::branch::ConfigureRequest {
        branch: &config.branch_name,
        remote_name,
        checkout: config.checkout,
        start_over: config.start_over,
        required_restart: !metadata_compatible,
    };
    let outcome = dvh_repo::branch::configure(repo, &config.output, current_branch.as_deref(), &configure_request)?;
    if outcome.freshly_initialized {
        dvh_repo::branch::commit_initial_metadata(repo, &config.output, &config.committer, plan.start.as_str())?;
    }

    let catalogue_order: Vec<VersionId> = resolution.versions.iter().map(|v| v.id.clone()).collect();
    let filtered_ids: Vec<VersionId> = plan.filtered.iter().map(|v| v.id.clone()).collect();
    let to_generate_ids: Vec<VersionId> = to_generate.iter().map(|v| v.id.clone()).collect();

    let resume_ctx = resume::ResumeContext {
        to_generate: &to_generate_ids,
        catalogue_ids: &catalogue_order,
        filtered_ids: &filtered_ids,
        catalogue_order: &catalogue_order,
        start: &plan.start,
        end: &plan.end,
    };

    let skip_count = match resume::resolve_skip_count(repo, &config.committer, outcome.freshly_initialized, &resume_ctx) {
        Ok(n) => n,
        Err(e) if config.start_over_if_required => {
            tracing::warn!("resume mismatch, restarting branch '{}': {e}", config.branch_name);
            let restart_request = dvh_repo::branch::ConfigureRequest {
                branch: &config.branch_name,
                remote_name,
                checkout: false,
                start_over: false,
                required_restart: true,
            };
            dvh_repo::branch::configure(
                repo,
                &config.output,
                Some(config.branch_name.as_str()),
                &restart_request,
            )?;
            dvh_repo::branch::commit_initial_metadata(repo, &config.output, &config.committer, plan.start.as_str())?;
            0
        }
        Err(e) => return Err(e),
    };

    let library_cache_root = dvh_core::artifact::library_cache_root(&config.cache);
    let filter = dvh_sync::filters::PathFilter::new(&config.include, &config.exclude)?;
    let mut push_scheduler = dvh_repo::push::PushScheduler::new();

    let remaining = &to_generate[skip_count..];
    let mut fetched = Vec::with_capacity(remaining.len());
    for info in remaining {
        let (detail_json, detail) = fetch_version_detail(client, &info.manifest_url).await?;
        fetched.push((info.clone(), detail, detail_json));
    }

    let mut acquire_opts =
        dvh_acquire::AcquireOptions::new(config.partial_cache, branch_type_label(config.branch_spec.branch_type));
    acquire_opts.extra_mappings_dir = config.extra_mappings.clone();
    let work: Vec<dvh_acquire::VersionWork> = fetched
        .iter()
        .map(|(info, detail, detail_json)| dvh_acquire::VersionWork {
            info: info.clone(),
            detail: detail.clone(),
            detail_json: detail_json.clone(),
        })
        .collect();
    dvh_acquire::acquire_all_with(client.clone(), &config.cache, work, &acquire_opts).await?;

    for (info, detail, _) in &fetched {
        process_version(
            config,
            repo,
            remote_name,
            &library_cache_root,
            &filter,
            &mut push_scheduler,
            info,
            detail,
        )
        .await?;
    }

    if config.push {
        if let Some(name) = remote_name {
            dvh_repo::push::push_remaining(repo, name, &config.branch_name)?;
        }
    }

    Ok(())
}

/// Drive a single already-acquired version through merge/remap, decompile,
/// and sync/commit. Acquisition itself has already completed by the time
/// this runs, via the bounded pool in [`run_inner`].
#[allow(clippy::too_many_arguments)]
async fn process_version(
    config: &PipelineConfig,
    repo: &git2::Repository,
    remote_name: Option<&str>,
    library_cache_root: &std::path::Path,
    filter: &dvh_sync::filters::PathFilter,
    push_scheduler: &mut dvh_repo::push::PushScheduler,
    info: &VersionInfo,
    detail: &VersionDetail,
) -> Result<(), DvhError> {
    let version_dir = dvh_core::artifact::version_cache_dir(&config.cache, info.id.as_str());

    let client_mappings_text = std::fs::read_to_string(version_dir.join(ArtifactNames::CLIENT_MAPPINGS)).ok();
    let server_mappings_text = std::fs::read_to_string(version_dir.join(ArtifactNames::SERVER_MAPPINGS)).ok();
    let merged = dvh_mapping::merge(client_mappings_text.as_deref(), server_mappings_text.as_deref())?;

    if !detail.is_unobfuscated && merged.is_none() {
        tracing::warn!(id = info.id.as_str(), "mapping missing, skipping version");
        return Ok(());
    }
    let mapping_file = match (&merged, &client_mappings_text) {
        (Some(_), Some(text)) => Some(dvh_mapping::parse(text)?),
        _ => None,
    };

    let client_jar = version_dir.join(ArtifactNames::CLIENT_JAR);
    let server_jar = version_dir.join(ArtifactNames::SERVER_JAR);
    let client_sha1 = detail.download(DownloadKind::Client).map(|d| d.sha1.as_str()).unwrap_or("");
    let server_sha1 = detail.download(DownloadKind::Server).map(|d| d.sha1.as_str()).unwrap_or("");

    let merge_inputs = dvh_merge::MergeInputs {
        version_dir: &version_dir,
        client_jar: &client_jar,
        server_jar: &server_jar,
        client_sha1,
        server_sha1,
        is_unobfuscated: detail.is_unobfuscated,
        mappings: mapping_file.as_ref(),
        partial_cache: config.partial_cache,
    };
    let joined_jar = dvh_merge::run(&merge_inputs)?;

    let decompiled_jar = dvh_decompile::run(&version_dir, library_cache_root, &joined_jar, !detail.is_unobfuscated)?;

    let outcome = dvh_sync::sync_archive(&config.output, &decompiled_jar, filter, None)?;
    let committed = dvh_sync::commit_outcome(repo, &outcome, info.id.as_str(), info.time_released, &config.committer)?;

    if committed.is_some() && config.push {
        if let Some(name) = remote_name {
            if push_scheduler.record_commit() {
                dvh_repo::push::push_remaining(repo, name, &config.branch_name)?;
            }
        }
    }

    Ok(())
}

async fn fetch_version_detail(client: &reqwest::Client, manifest_url: &str) -> Result<(String, VersionDetail), DvhError> {
    let resp = client.get(manifest_url).send().await.map_err(|e| DvhError::ManifestUnavailable {
        message: format!("request to {manifest_url} failed: {e}"),
    })?;
    if !resp.status().is_success() {
        return Err(DvhError::ManifestUnavailable {
            message: format!("HTTP {} from {manifest_url}", resp.status()),
        });
    }
    let text = resp.text().await.map_err(|e| DvhError::ManifestUnavailable {
        message: format!("failed to read {manifest_url}: {e}"),
    })?;
    let detail: VersionDetail = serde_json::from_str(&text).map_err(|e| DvhError::ManifestUnavailable {
        message: format!("failed to parse version detail at {manifest_url}: {e}"),
    })?;
    Ok((text, detail))
}

fn branch_type_label(branch_type: BranchType) -> &'static str {
    match branch_type {
        BranchType::Release => "release",
        BranchType::Dev => "dev",
        BranchType::Custom => "custom",
    }
}
