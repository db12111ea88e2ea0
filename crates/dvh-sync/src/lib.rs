//! Working-tree syncer (WTS): reconciles the decompiled archive against the
//! existing `src/main/{java,resources}` tree and commits the delta (spec
//! §4.9).

pub mod filters;
pub mod tree;

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};
use zip::ZipArchive;

use dvh_core::Identity;
use dvh_util::errors::DvhError;

use filters::PathFilter;

/// Paths added and removed by a single sync pass, already forward-slash and
/// relative to the working tree root.
#[derive(Debug, Default)]
pub struct SyncOutcome {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl SyncOutcome {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// A post-processing hook run after archive entries are synced but before
/// stale files are deleted (spec §4.9 step 3: "inject or rewrite specific
/// files under the working tree"). Returns the working-tree-relative,
/// forward-slash paths it added or rewrote.
pub type EnhancementHook<'a> = dyn Fn(&Path) -> Result<Vec<String>, DvhError> + 'a;

/// Reconcile `working_tree_root`'s `src/main` tree against `decompiled_archive`,
/// returning what changed. Does not commit; call [`commit_outcome`] with the
/// result to do that.
pub fn sync_archive(
    working_tree_root: &Path,
    decompiled_archive: &Path,
    filter: &PathFilter,
    enhancement: Option<&EnhancementHook>,
) -> Result<SyncOutcome, DvhError> {
    let mut remaining = tree::enumerate(working_tree_root)?;
    let mut added = Vec::new();
    let mut renamed_away = Vec::new();

    let file = std::fs::File::open(decompiled_archive).map_err(DvhError::Io)?;
    let mut archive = ZipArchive::new(file).map_err(|e| DvhError::Generic {
        message: format!("failed to open {}: {e}", decompiled_archive.display()),
    })?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| DvhError::Generic {
            message: format!("failed to read zip entry {i}: {e}"),
        })?;
        if entry.is_dir() {
            continue;
        }
        let archive_path = entry.name().to_string();
        if !filter.allows(&archive_path) {
            continue;
        }

        let destination_rel = tree::destination_for(&archive_path);
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents).map_err(DvhError::Io)?;

        sync_one_entry(
            working_tree_root,
            &destination_rel,
            &contents,
            &mut remaining,
            &mut added,
            &mut renamed_away,
        )?;
    }

    if let Some(hook) = enhancement {
        for path in hook(working_tree_root)? {
            remaining.remove(&path);
            added.push(path);
        }
    }

    // Stale entries in `remaining` still need deleting from disk; a
    // rename's real target in `renamed_away` was already deleted (and
    // possibly recreated by the entry's own copy, e.g. through a dangling
    // symlink) inside `sync_one_entry`, so it must not go through this
    // pass a second time.
    let mut stale: Vec<String> = remaining.into_iter().collect();
    stale.sort();
    for path in &stale {
        let full = working_tree_root.join(path);
        if full.is_file() {
            std::fs::remove_file(&full).map_err(DvhError::Io)?;
        }
    }

    let mut removed: Vec<String> = stale.into_iter().chain(renamed_away).collect();
    removed.sort();
    removed.dedup();

    Ok(SyncOutcome { added, removed })
}

/// Sync one archive entry to its destination, handling the already-present
/// (possibly case-renamed) and newly-added cases (spec §4.9 step 2).
///
/// Membership in `remaining` (E) is checked by canonicalized real path, not
/// by the logical destination string: on a case-insensitive filesystem, a
/// file that's logically at a different case than `destination_rel` still
/// resolves to the same on-disk file, and `E` was populated with whatever
/// case `walkdir` actually observed.
fn sync_one_entry(
    working_tree_root: &Path,
    destination_rel: &str,
    contents: &[u8],
    remaining: &mut HashSet<String>,
    added: &mut Vec<String>,
    renamed_away: &mut Vec<String>,
) -> Result<(), DvhError> {
    let full_path = working_tree_root.join(destination_rel);

    let Some(real_rel) = real_relative_path(working_tree_root, &full_path)? else {
        write_entry(&full_path, contents)?;
        added.push(destination_rel.to_string());
        return Ok(());
    };

    if real_rel != destination_rel {
        // Case-insensitive rename: the file E tracks under its real name is
        // not the one this entry logically belongs at. Delete the real
        // target and record it as removed (spec §4.9 step 2), and record
        // the logical target as added.
        remaining.remove(&real_rel);
        std::fs::remove_file(working_tree_root.join(&real_rel)).map_err(DvhError::Io)?;
        renamed_away.push(real_rel);
        write_entry(&full_path, contents)?;
        added.push(destination_rel.to_string());
        return Ok(());
    }

    remaining.remove(destination_rel);
    let existing_hash = dvh_util::hash::sha1_file(&full_path).map_err(DvhError::Io)?;
    if existing_hash != dvh_util::hash::sha1_bytes(contents) {
        write_entry(&full_path, contents)?;
        added.push(destination_rel.to_string());
    }
    Ok(())
}

/// If `full_path` exists, resolve it through any symlinks and return its
/// real path as a forward-slash string relative to `working_tree_root`.
fn real_relative_path(working_tree_root: &Path, full_path: &Path) -> Result<Option<String>, DvhError> {
    if !full_path.exists() {
        return Ok(None);
    }
    let real = std::fs::canonicalize(full_path).map_err(DvhError::Io)?;
    let root_real = std::fs::canonicalize(working_tree_root).map_err(DvhError::Io)?;
    let relative = real
        .strip_prefix(&root_real)
        .unwrap_or(&real)
        .to_string_lossy()
        .replace('\\', "/");
    Ok(Some(relative))
}

fn write_entry(full_path: &Path, contents: &[u8]) -> Result<(), DvhError> {
    if let Some(parent) = full_path.parent() {
        dvh_util::fs::ensure_dir(parent).map_err(DvhError::Io)?;
    }
    std::fs::write(full_path, contents).map_err(DvhError::Io)
}

/// Stage `outcome`'s adds/removes and commit, with the version id as message
/// and `release_time` as both author and commit date (spec §4.9 step 5).
/// No-op (returns `Ok(None)`) when `outcome` is empty.
pub fn commit_outcome(
    repo: &git2::Repository,
    outcome: &SyncOutcome,
    version_id: &str,
    release_time: DateTime<Utc>,
    committer: &Identity,
) -> Result<Option<git2::Oid>, DvhError> {
    if outcome.is_empty() {
        return Ok(None);
    }

    let mut index = repo.index().map_err(to_dvh_error)?;
    for path in &outcome.added {
        index.add_path(Path::new(path)).map_err(to_dvh_error)?;
    }
    for path in &outcome.removed {
        index.remove_path(Path::new(path)).map_err(to_dvh_error)?;
    }
    index.write().map_err(to_dvh_error)?;

    let tree_oid = index.write_tree().map_err(to_dvh_error)?;
    let tree = repo.find_tree(tree_oid).map_err(to_dvh_error)?;

    let time = git2::Time::new(release_time.timestamp(), 0);
    let signature =
        git2::Signature::new(&committer.name, &committer.email, &time).map_err(to_dvh_error)?;

    let parents = match repo.head().ok().and_then(|h| h.target()) {
        Some(oid) => vec![repo.find_commit(oid).map_err(to_dvh_error)?],
        None => Vec::new(),
    };
    let parent_refs: Vec<&git2::Commit> = parents.iter().collect();

    let oid = repo
        .commit(
            Some("HEAD"),
            &signature,
            &signature,
            version_id,
            &tree,
            &parent_refs,
        )
        .map_err(to_dvh_error)?;

    Ok(Some(oid))
}

fn to_dvh_error(err: git2::Error) -> DvhError {
    DvhError::Generic {
        message: format!("git error: {err}"),
    }
}
