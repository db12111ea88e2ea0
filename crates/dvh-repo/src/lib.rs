//! Repository driver (RD): branch lifecycle, remote provisioning, and the
//! batched push protocol over the operator's working tree (spec §4.10).

pub mod branch;
pub mod push;
pub mod remote;

use std::path::Path;

use dvh_util::errors::DvhError;

/// Open the repository rooted at `working_tree_root`, initializing a fresh
/// one if none exists yet (spec §4.10 state machine: `start`).
pub fn open_or_init(working_tree_root: &Path) -> Result<git2::Repository, DvhError> {
    match git2::Repository::open(working_tree_root) {
        Ok(repo) => Ok(repo),
        Err(_) => git2::Repository::init(working_tree_root).map_err(to_dvh_error),
    }
}

fn to_dvh_error(err: git2::Error) -> DvhError {
    DvhError::Generic {
        message: format!("git error: {err}"),
    }
}
