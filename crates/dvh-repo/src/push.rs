//! Batched push protocol (spec §4.10): push every `BATCH_SIZE` commits
//! during the loop and once on completion, always as a force push.

use git2::{Oid, PushOptions, RemoteCallbacks, Repository, Sort};

use dvh_util::errors::DvhError;

use crate::to_dvh_error;

/// Number of commits per push batch.
pub const BATCH_SIZE: usize = 10;

/// Tracks commits made since the last push so the driving loop can push
/// every [`BATCH_SIZE`] commits without threading a counter through itself.
#[derive(Debug, Default)]
pub struct PushScheduler {
    since_last_push: usize,
}

impl PushScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a commit; returns true once `BATCH_SIZE` commits have
    /// accumulated since the last reset, and resets the counter.
    pub fn record_commit(&mut self) -> bool {
        self.since_last_push += 1;
        if self.since_last_push >= BATCH_SIZE {
            self.since_last_push = 0;
            true
        } else {
            false
        }
    }
}

/// Push whatever of `branch`'s local history the remote is missing,
/// force-pushed in `BATCH_SIZE`-sized chunks, oldest chunk first.
pub fn push_remaining(repo: &Repository, remote_name: &str, branch: &str) -> Result<(), DvhError> {
    let local = commits_newest_first(repo, &format!("refs/heads/{branch}"))?;
    let remote = commits_newest_first(repo, &format!("refs/remotes/{remote_name}/{branch}")).unwrap_or_default();

    let common_index = remote
        .iter()
        .find_map(|remote_oid| local.iter().position(|local_oid| local_oid == remote_oid));

    match common_index {
        Some(0) => Ok(()),
        Some(i) => push_chunks(repo, remote_name, branch, &local[..i]),
        None => push_chunks(repo, remote_name, branch, &local),
    }
}

/// `commits_newest_first` is newest-to-oldest; this pushes them oldest
/// chunk first so each push fast-forwards its predecessor locally.
fn push_chunks(repo: &Repository, remote_name: &str, branch: &str, commits_newest_first: &[Oid]) -> Result<(), DvhError> {
    let oldest_first: Vec<Oid> = commits_newest_first.iter().rev().copied().collect();
    for chunk in oldest_first.chunks(BATCH_SIZE) {
        let Some(tip) = chunk.last() else { continue };
        force_push(repo, remote_name, branch, *tip)?;
    }
    Ok(())
}

/// Force-push `branch` so the remote ref points at `tip`, regardless of
/// what the local branch ref currently points at.
fn force_push(repo: &Repository, remote_name: &str, branch: &str, tip: Oid) -> Result<(), DvhError> {
    let mut remote = repo.find_remote(remote_name).map_err(to_dvh_error)?;
    let refspec = format!("+{tip}:refs/heads/{branch}");

    let failure = std::cell::RefCell::new(None);
    let mut callbacks = RemoteCallbacks::new();
    callbacks.push_update_reference(|refname, status| {
        if let Some(message) = status {
            if !message.eq_ignore_ascii_case("up to date") {
                *failure.borrow_mut() = Some(format!("{refname}: {message}"));
            }
        }
        Ok(())
    });

    let mut options = PushOptions::new();
    options.remote_callbacks(callbacks);
    remote.push(&[refspec.as_str()], Some(&mut options)).map_err(to_dvh_error)?;

    match failure.into_inner() {
        Some(message) => Err(DvhError::PushFailed { message }),
        None => Ok(()),
    }
}

fn commits_newest_first(repo: &Repository, refname: &str) -> Result<Vec<Oid>, DvhError> {
    let reference = repo.find_reference(refname).map_err(to_dvh_error)?;
    let tip = reference.target().ok_or_else(|| DvhError::Generic {
        message: format!("{refname} is not a direct reference"),
    })?;

    let mut revwalk = repo.revwalk().map_err(to_dvh_error)?;
    revwalk.push(tip).map_err(to_dvh_error)?;
    revwalk.set_sorting(Sort::TIME).map_err(to_dvh_error)?;
    revwalk.map(|oid| oid.map_err(to_dvh_error)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheduler_fires_every_batch_size_commits() {
        let mut scheduler = PushScheduler::new();
        let mut fired = 0;
        for _ in 0..BATCH_SIZE * 2 {
            if scheduler.record_commit() {
                fired += 1;
            }
        }
        assert_eq!(fired, 2);
    }

    #[test]
    fn scheduler_does_not_fire_before_batch_size() {
        let mut scheduler = PushScheduler::new();
        for _ in 0..BATCH_SIZE - 1 {
            assert!(!scheduler.record_commit());
        }
    }

    #[test]
    fn push_to_bare_remote_advances_ref() {
        let local_dir = tempfile::TempDir::new().unwrap();
        let bare_dir = tempfile::TempDir::new().unwrap();
        let bare = Repository::init_bare(bare_dir.path()).unwrap();
        drop(bare);

        let repo = Repository::init(local_dir.path()).unwrap();
        std::fs::write(local_dir.path().join("a.txt"), b"a").unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(std::path::Path::new("a.txt")).unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let sig = git2::Signature::now("Historian", "historian@example.invalid").unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "first", &tree, &[]).unwrap();

        let branch_name = repo.head().unwrap().shorthand().unwrap().to_string();
        repo.remote("origin", bare_dir.path().to_str().unwrap()).unwrap();

        force_push(&repo, "origin", &branch_name, repo.head().unwrap().target().unwrap()).unwrap();

        let bare = Repository::open(bare_dir.path()).unwrap();
        assert!(bare.find_reference(&format!("refs/heads/{branch_name}")).is_ok());
    }
}
