//! Remote provisioning and eager initial fetch (spec §4.10).

use git2::{FetchOptions, RemoteCallbacks, Repository};

use dvh_util::errors::DvhError;

use crate::to_dvh_error;

/// Scan `repo`'s existing remotes for one whose URL already equals `url`;
/// reuse it if found, otherwise add a new one under the first unused name
/// in `origin`, `origin1`, `origin2`, ... Returns the remote's name and
/// whether it was newly added (so the caller can remove it on exit).
pub fn provision(repo: &Repository, url: &str) -> Result<(String, bool), DvhError> {
    let names = repo.remotes().map_err(to_dvh_error)?;
    for name in names.iter().flatten() {
        if let Ok(remote) = repo.find_remote(name) {
            if remote.url() == Some(url) {
                return Ok((name.to_string(), false));
            }
        }
    }

    let mut candidate = "origin".to_string();
    let mut suffix = 0u32;
    while repo.find_remote(&candidate).is_ok() {
        suffix += 1;
        candidate = format!("origin{suffix}");
    }
    repo.remote(&candidate, url).map_err(to_dvh_error)?;
    Ok((candidate, true))
}

/// Remove a remote this run added, leaving reused remotes untouched.
pub fn remove(repo: &Repository, name: &str) -> Result<(), DvhError> {
    repo.remote_delete(name).map_err(to_dvh_error)
}

pub fn has_branch(repo: &Repository, remote_name: &str, branch: &str) -> bool {
    repo.find_reference(&format!("refs/remotes/{remote_name}/{branch}"))
        .is_ok()
}

/// Eager initial fetch of every ref from `remote_name`, logging transfer
/// progress as it streams.
pub fn fetch(repo: &Repository, remote_name: &str) -> Result<(), DvhError> {
    let mut remote = repo.find_remote(remote_name).map_err(to_dvh_error)?;

    let mut callbacks = RemoteCallbacks::new();
    callbacks.transfer_progress(|progress| {
        tracing::info!(
            received = progress.received_objects(),
            total = progress.total_objects(),
            "fetch progress"
        );
        true
    });

    let mut options = FetchOptions::new();
    options.remote_callbacks(callbacks);
    remote
        .fetch(&[] as &[&str], Some(&mut options), None)
        .map_err(to_dvh_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn provision_adds_origin_when_none_match() {
        let tmp = TempDir::new().unwrap();
        let repo = Repository::init(tmp.path()).unwrap();
        let (name, added) = provision(&repo, "https://example.invalid/repo.git").unwrap();
        assert_eq!(name, "origin");
        assert!(added);
    }

    #[test]
    fn provision_reuses_existing_url() {
        let tmp = TempDir::new().unwrap();
        let repo = Repository::init(tmp.path()).unwrap();
        repo.remote("origin", "https://example.invalid/repo.git").unwrap();

        let (name, added) = provision(&repo, "https://example.invalid/repo.git").unwrap();
        assert_eq!(name, "origin");
        assert!(!added);
    }

    #[test]
    fn provision_picks_first_unused_suffix() {
        let tmp = TempDir::new().unwrap();
        let repo = Repository::init(tmp.path()).unwrap();
        repo.remote("origin", "https://example.invalid/one.git").unwrap();
        repo.remote("origin1", "https://example.invalid/two.git").unwrap();

        let (name, added) = provision(&repo, "https://example.invalid/three.git").unwrap();
        assert_eq!(name, "origin2");
        assert!(added);
    }

    #[test]
    fn remove_deletes_remote() {
        let tmp = TempDir::new().unwrap();
        let repo = Repository::init(tmp.path()).unwrap();
        repo.remote("origin", "https://example.invalid/repo.git").unwrap();
        remove(&repo, "origin").unwrap();
        assert!(repo.find_remote("origin").is_err());
    }
}
