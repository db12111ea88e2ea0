//! Branch lifecycle state machine (spec §4.10): open-existing-or-init-new,
//! then orphan/checkout transitions out of `configured`, always followed by
//! a hard reset and clean.

use std::path::Path;

use git2::{build::CheckoutBuilder, BranchType, Repository, ResetType, Sort, Status, StatusOptions};

use dvh_core::identity::Identity;
use dvh_core::repo_state::{BranchMetadata, METADATA_FILE, SCHEMA_VERSION};
use dvh_util::errors::DvhError;

use crate::to_dvh_error;

/// Commit message stamped on the branch's initial metadata commit, used by
/// the resume planner to recognize and skip it when walking history.
pub const INITIAL_COMMIT_MESSAGE: &str = "Initial commit";

/// What the caller wants the branch to look like after [`configure`] runs.
pub struct ConfigureRequest<'a> {
    pub branch: &'a str,
    pub remote_name: Option<&'a str>,
    pub checkout: bool,
    pub start_over: bool,
    pub required_restart: bool,
}

/// Result of a [`configure`] call.
pub struct ConfigureOutcome {
    /// True when `branch` was (re-)created with no history this call —
    /// the resume planner treats this as `skipCount = 0`.
    pub freshly_initialized: bool,
}

pub fn branch_exists(repo: &Repository, name: &str) -> bool {
    repo.find_branch(name, BranchType::Local).is_ok()
}

fn remote_has_branch(repo: &Repository, remote_name: Option<&str>, branch: &str) -> bool {
    let Some(remote_name) = remote_name else {
        return false;
    };
    repo.find_reference(&format!("refs/remotes/{remote_name}/{branch}"))
        .is_ok()
}

fn delete_branch(repo: &Repository, name: &str) -> Result<(), DvhError> {
    if let Ok(mut branch) = repo.find_branch(name, BranchType::Local) {
        branch.delete().map_err(to_dvh_error)?;
    }
    Ok(())
}

/// Check out `branch` with no parent history: clears the working tree and
/// index, then points HEAD at the (not-yet-existing) branch ref. The first
/// commit made afterwards creates the ref.
fn orphan_checkout(repo: &Repository, working_tree_root: &Path, branch: &str) -> Result<(), DvhError> {
    clear_working_tree(working_tree_root)?;
    let mut index = repo.index().map_err(to_dvh_error)?;
    index.clear().map_err(to_dvh_error)?;
    index.write().map_err(to_dvh_error)?;
    repo.set_head(&format!("refs/heads/{branch}"))
        .map_err(to_dvh_error)
}

fn checkout_local_branch(repo: &Repository, branch: &str) -> Result<(), DvhError> {
    let refname = format!("refs/heads/{branch}");
    let obj = repo.revparse_single(&refname).map_err(to_dvh_error)?;
    let mut checkout = CheckoutBuilder::new();
    checkout.force();
    repo.checkout_tree(&obj, Some(&mut checkout)).map_err(to_dvh_error)?;
    repo.set_head(&refname).map_err(to_dvh_error)
}

fn checkout_remote_tracking(repo: &Repository, remote_name: &str, branch: &str) -> Result<(), DvhError> {
    let remote_refname = format!("refs/remotes/{remote_name}/{branch}");
    let obj = repo.revparse_single(&remote_refname).map_err(to_dvh_error)?;
    let commit = obj.peel_to_commit().map_err(to_dvh_error)?;
    repo.branch(branch, &commit, true).map_err(to_dvh_error)?;

    let mut checkout = CheckoutBuilder::new();
    checkout.force();
    repo.checkout_tree(&obj, Some(&mut checkout)).map_err(to_dvh_error)?;
    repo.set_head(&format!("refs/heads/{branch}")).map_err(to_dvh_error)?;

    let mut local = repo.find_branch(branch, BranchType::Local).map_err(to_dvh_error)?;
    local
        .set_upstream(Some(&format!("{remote_name}/{branch}")))
        .map_err(to_dvh_error)
}

fn clear_working_tree(working_tree_root: &Path) -> Result<(), DvhError> {
    if !working_tree_root.is_dir() {
        return Ok(());
    }
    for entry in std::fs::read_dir(working_tree_root).map_err(DvhError::Io)? {
        let entry = entry.map_err(DvhError::Io)?;
        if entry.file_name() == ".git" {
            continue;
        }
        let path = entry.path();
        if path.is_dir() {
            std::fs::remove_dir_all(&path).map_err(DvhError::Io)?;
        } else {
            std::fs::remove_file(&path).map_err(DvhError::Io)?;
        }
    }
    Ok(())
}

/// Hard-reset HEAD to its own commit (discarding index/working-tree
/// modifications) and delete untracked files, mirroring `git reset --hard`
/// followed by `git clean -fd`.
fn hard_reset_and_clean(repo: &Repository) -> Result<(), DvhError> {
    if let Ok(head) = repo.head() {
        if let Some(oid) = head.target() {
            let commit = repo.find_commit(oid).map_err(to_dvh_error)?;
            let mut checkout = CheckoutBuilder::new();
            checkout.force();
            repo.reset(commit.as_object(), ResetType::Hard, Some(&mut checkout))
                .map_err(to_dvh_error)?;
        }
    }

    let workdir = repo.workdir().ok_or_else(|| DvhError::Generic {
        message: "repository has no working tree".to_string(),
    })?;
    let mut opts = StatusOptions::new();
    opts.include_untracked(true).recurse_untracked_dirs(true);
    let statuses = repo.statuses(Some(&mut opts)).map_err(to_dvh_error)?;
    for entry in statuses.iter() {
        if !entry.status().contains(Status::WT_NEW) {
            continue;
        }
        if let Some(path) = entry.path() {
            let full = workdir.join(path);
            if full.is_file() {
                std::fs::remove_file(&full).map_err(DvhError::Io)?;
            }
        }
    }
    Ok(())
}

/// Drive the `configured` transitions of the branch lifecycle state machine
/// (spec §4.10), always ending with a hard reset and clean.
pub fn configure(
    repo: &Repository,
    working_tree_root: &Path,
    current_branch: Option<&str>,
    request: &ConfigureRequest,
) -> Result<ConfigureOutcome, DvhError> {
    let exists = branch_exists(repo, request.branch);
    let mut freshly_initialized = false;

    if (request.start_over || request.required_restart) && exists {
        orphan_checkout(repo, working_tree_root, "orphan_temp")?;
        delete_branch(repo, request.branch)?;
        orphan_checkout(repo, working_tree_root, request.branch)?;
        delete_branch(repo, "orphan_temp")?;
        freshly_initialized = true;
    } else if request.checkout && remote_has_branch(repo, request.remote_name, request.branch) {
        if exists {
            delete_branch(repo, request.branch)?;
        }
        let remote_name = request.remote_name.ok_or_else(|| DvhError::ArgumentError {
            message: "checkout requested but no remote configured".to_string(),
        })?;
        checkout_remote_tracking(repo, remote_name, request.branch)?;
    } else if current_branch != Some(request.branch) {
        if exists {
            checkout_local_branch(repo, request.branch)?;
        } else {
            orphan_checkout(repo, working_tree_root, request.branch)?;
            freshly_initialized = true;
        }
    }

    hard_reset_and_clean(repo)?;

    Ok(ConfigureOutcome { freshly_initialized })
}

/// Write `Snowblower.txt` and make it the branch's initial commit, with the
/// fixed epoch date spec §6 requires for that one commit.
pub fn commit_initial_metadata(
    repo: &Repository,
    working_tree_root: &Path,
    committer: &Identity,
    start: &str,
) -> Result<git2::Oid, DvhError> {
    let metadata = BranchMetadata::new(SCHEMA_VERSION, start);
    let path = working_tree_root.join(METADATA_FILE);
    dvh_util::fs::write_atomic(&path, metadata.render().as_bytes()).map_err(DvhError::Io)?;

    let mut index = repo.index().map_err(to_dvh_error)?;
    index.add_path(Path::new(METADATA_FILE)).map_err(to_dvh_error)?;
    index.write().map_err(to_dvh_error)?;
    let tree_oid = index.write_tree().map_err(to_dvh_error)?;
    let tree = repo.find_tree(tree_oid).map_err(to_dvh_error)?;

    let time = git2::Time::new(0, 0);
    let signature = git2::Signature::new(&committer.name, &committer.email, &time).map_err(to_dvh_error)?;

    repo.commit(Some("HEAD"), &signature, &signature, INITIAL_COMMIT_MESSAGE, &tree, &[])
        .map_err(to_dvh_error)
}

/// Read the branch's initial commit's metadata file and check it matches
/// the current schema and `start` version (spec §3 RepoState invariant).
/// `Ok(true)` when there is no commit yet at all (nothing to validate).
pub fn validate_initial_commit(repo: &Repository, start: &str) -> Result<bool, DvhError> {
    let tip = match repo.head().ok().and_then(|h| h.target()) {
        Some(tip) => tip,
        None => return Ok(true),
    };
    validate_metadata_from(repo, tip, start)
}

/// Same check as [`validate_initial_commit`] but against a named local
/// branch rather than HEAD, so the caller can decide on a restart before
/// checking the branch out. `Ok(true)` when the branch doesn't exist yet.
pub fn validate_branch_metadata(repo: &Repository, branch: &str, start: &str) -> Result<bool, DvhError> {
    let Ok(branch_ref) = repo.find_branch(branch, BranchType::Local) else {
        return Ok(true);
    };
    let Some(tip) = branch_ref.get().target() else {
        return Ok(true);
    };
    validate_metadata_from(repo, tip, start)
}

fn validate_metadata_from(repo: &Repository, tip: git2::Oid, start: &str) -> Result<bool, DvhError> {
    let mut revwalk = repo.revwalk().map_err(to_dvh_error)?;
    revwalk.push(tip).map_err(to_dvh_error)?;
    revwalk
        .set_sorting(Sort::TIME | Sort::REVERSE)
        .map_err(to_dvh_error)?;
    let Some(first) = revwalk.next() else {
        return Ok(true);
    };
    let first_oid = first.map_err(to_dvh_error)?;
    let commit = repo.find_commit(first_oid).map_err(to_dvh_error)?;
    let tree = commit.tree().map_err(to_dvh_error)?;

    let entry = tree.get_path(Path::new(METADATA_FILE)).map_err(|_| DvhError::MetadataMismatch {
        message: format!("initial commit has no {METADATA_FILE}"),
    })?;
    let blob = repo.find_blob(entry.id()).map_err(to_dvh_error)?;
    let text = std::str::from_utf8(blob.content()).map_err(|e| DvhError::MetadataMismatch {
        message: e.to_string(),
    })?;
    let metadata = BranchMetadata::parse(text)?;
    Ok(metadata.is_compatible(start))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn committer() -> Identity {
        Identity::default_committer()
    }

    #[test]
    fn fresh_branch_is_orphan_and_accepts_initial_commit() {
        let tmp = TempDir::new().unwrap();
        let repo = Repository::init(tmp.path()).unwrap();

        let request = ConfigureRequest {
            branch: "historian",
            remote_name: None,
            checkout: false,
            start_over: false,
            required_restart: false,
        };
        let outcome = configure(&repo, tmp.path(), None, &request).unwrap();
        assert!(outcome.freshly_initialized);
        assert!(!branch_exists(&repo, "historian"));

        commit_initial_metadata(&repo, tmp.path(), &committer(), "1.14.4").unwrap();
        assert!(branch_exists(&repo, "historian"));
        assert!(validate_initial_commit(&repo, "1.14.4").unwrap());
        assert!(!validate_initial_commit(&repo, "1.15").unwrap());
    }

    #[test]
    fn start_over_recreates_existing_branch() {
        let tmp = TempDir::new().unwrap();
        let repo = Repository::init(tmp.path()).unwrap();

        let request = ConfigureRequest {
            branch: "historian",
            remote_name: None,
            checkout: false,
            start_over: false,
            required_restart: false,
        };
        configure(&repo, tmp.path(), None, &request).unwrap();
        commit_initial_metadata(&repo, tmp.path(), &committer(), "1.14.4").unwrap();
        std::fs::write(tmp.path().join("stale.txt"), b"stale").unwrap();

        let restart_request = ConfigureRequest {
            branch: "historian",
            remote_name: None,
            checkout: false,
            start_over: true,
            required_restart: false,
        };
        let outcome = configure(&repo, tmp.path(), Some("historian"), &restart_request).unwrap();
        assert!(outcome.freshly_initialized);
        assert!(!branch_exists(&repo, "historian"));
        assert!(!branch_exists(&repo, "orphan_temp"));
    }

    #[test]
    fn no_op_when_already_on_target_branch() {
        let tmp = TempDir::new().unwrap();
        let repo = Repository::init(tmp.path()).unwrap();
        let request = ConfigureRequest {
            branch: "historian",
            remote_name: None,
            checkout: false,
            start_over: false,
            required_restart: false,
        };
        configure(&repo, tmp.path(), None, &request).unwrap();
        commit_initial_metadata(&repo, tmp.path(), &committer(), "1.14.4").unwrap();

        let outcome = configure(&repo, tmp.path(), Some("historian"), &request).unwrap();
        assert!(!outcome.freshly_initialized);
    }

    #[test]
    fn validate_branch_metadata_peeks_without_checkout() {
        let tmp = TempDir::new().unwrap();
        let repo = Repository::init(tmp.path()).unwrap();
        let request = ConfigureRequest {
            branch: "historian",
            remote_name: None,
            checkout: false,
            start_over: false,
            required_restart: false,
        };
        configure(&repo, tmp.path(), None, &request).unwrap();
        commit_initial_metadata(&repo, tmp.path(), &committer(), "1.14.4").unwrap();

        assert!(validate_branch_metadata(&repo, "historian", "1.14.4").unwrap());
        assert!(!validate_branch_metadata(&repo, "historian", "1.15").unwrap());
        assert!(validate_branch_metadata(&repo, "nonexistent", "1.14.4").unwrap());
    }
}
