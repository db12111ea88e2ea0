//! Resume planner (RP): classifies a run against the repository's commit
//! history to derive a skip count, or to trigger a restart (spec §4.4).

use git2::{Repository, Sort};

use dvh_core::{Identity, VersionId};
use dvh_util::errors::DvhError;

/// Walk the head's history (newest first) for the newest commit whose
/// author identity matches `committer`, skipping the initial metadata
/// commit. Returns `None` when the branch has no such commit yet.
pub fn find_last_version_commit(repo: &Repository, committer: &Identity) -> Result<Option<String>, DvhError> {
    let head = match repo.head() {
        Ok(head) => head,
        Err(_) => return Ok(None),
    };
    let Some(tip) = head.target() else {
        return Ok(None);
    };

    let mut revwalk = repo.revwalk().map_err(to_dvh_error)?;
    revwalk.push(tip).map_err(to_dvh_error)?;
    revwalk.set_sorting(Sort::TIME).map_err(to_dvh_error)?;

    for oid in revwalk {
        let oid = oid.map_err(to_dvh_error)?;
        let commit = repo.find_commit(oid).map_err(to_dvh_error)?;
        let author = commit.author();
        if author.name() != Some(committer.name.as_str()) || author.email() != Some(committer.email.as_str()) {
            continue;
        }
        let message = commit.message().unwrap_or("").trim();
        if message == dvh_repo::branch::INITIAL_COMMIT_MESSAGE {
            continue;
        }
        return Ok(Some(message.to_string()));
    }
    Ok(None)
}

/// Everything [`resolve_skip_count`] needs about the plan this run is
/// executing, separate from the repository state it consults.
pub struct ResumeContext<'a> {
    /// The ordered sublist this run intends to generate, `[start, end]`.
    pub to_generate: &'a [VersionId],
    /// Every id known to the catalogue, regardless of branch policy.
    pub catalogue_ids: &'a [VersionId],
    /// Ids that survive branch policy filtering, independent of the
    /// `[start, end]` range slice.
    pub filtered_ids: &'a [VersionId],
    /// The full catalogue, ascending by release time — used to compare a
    /// stray committed id against `start`/`end` by position.
    pub catalogue_order: &'a [VersionId],
    pub start: &'a VersionId,
    pub end: &'a VersionId,
}

/// Derive how many leading entries of `ctx.to_generate` this run should
/// skip, per spec §4.4's ordered rules. `freshly_initialized` short-circuits
/// to zero per "branch was just (re-)created: skipCount = 0".
pub fn resolve_skip_count(
    repo: &Repository,
    committer: &Identity,
    freshly_initialized: bool,
    ctx: &ResumeContext,
) -> Result<usize, DvhError> {
    if freshly_initialized {
        return Ok(0);
    }

    let Some(last_id) = find_last_version_commit(repo, committer)? else {
        return Ok(0);
    };

    if let Some(i) = ctx.to_generate.iter().position(|v| v.as_str() == last_id) {
        return Ok(i + 1);
    }

    if !ctx.catalogue_ids.iter().any(|v| v.as_str() == last_id) {
        return Err(DvhError::ResumeMismatch {
            message: format!("last committed version '{last_id}' is not in the catalogue"),
        });
    }
    if !ctx.filtered_ids.iter().any(|v| v.as_str() == last_id) {
        return Err(DvhError::ResumeMismatch {
            message: format!("last committed version '{last_id}' is excluded by branch policy"),
        });
    }

    let position = |id: &str| ctx.catalogue_order.iter().position(|v| v.as_str() == id);
    let last_pos = position(&last_id).ok_or_else(|| DvhError::ResumeMismatch {
        message: format!("last committed version '{last_id}' has no position in the catalogue order"),
    })?;
    let start_pos = position(ctx.start.as_str()).ok_or_else(|| DvhError::ResumeMismatch {
        message: format!("start version '{}' has no position in the catalogue order", ctx.start.as_str()),
    })?;
    let end_pos = position(ctx.end.as_str()).ok_or_else(|| DvhError::ResumeMismatch {
        message: format!("end version '{}' has no position in the catalogue order", ctx.end.as_str()),
    })?;

    if last_pos < start_pos {
        return Err(DvhError::ResumeMismatch {
            message: format!("last committed version '{last_id}' is older than start"),
        });
    }
    if last_pos > end_pos {
        return Ok(ctx.to_generate.len());
    }

    Err(DvhError::ResumeMismatch {
        message: format!("last committed version '{last_id}' is within range but absent from the current plan"),
    })
}

fn to_dvh_error(err: git2::Error) -> DvhError {
    DvhError::Generic {
        message: format!("git error: {err}"),
    }
}
