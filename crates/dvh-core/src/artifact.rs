//! Canonical per-version artifact filenames (spec §3/§6).

use std::path::{Path, PathBuf};

/// Filenames produced under a single version's cache directory, plus
/// helpers for the sibling `.cache` fingerprint file each pairs with.
pub struct ArtifactNames;

impl ArtifactNames {
    pub const VERSION_JSON: &'static str = "version.json";
    pub const CLIENT_JAR: &'static str = "client.jar";
    pub const SERVER_JAR: &'static str = "server.jar";
    pub const SERVER_EXTRACTED_JAR: &'static str = "server-extracted.jar";
    pub const CLIENT_MAPPINGS: &'static str = "client_mappings.txt";
    pub const SERVER_MAPPINGS: &'static str = "server_mappings.txt";
    pub const MERGED_MAPPINGS: &'static str = "moj_to_obf.tsrg";
    pub const JOINED_JAR: &'static str = "joined.jar";
    pub const JOINED_DECOMPILED_JAR: &'static str = "joined-decompiled.jar";

    /// The sibling fingerprint file for a cache-stage artifact, e.g.
    /// `joined.jar` -> `joined.jar.cache`.
    pub fn cache_sidecar(artifact_filename: &str) -> String {
        format!("{artifact_filename}.cache")
    }
}

/// The per-version cache directory under `<cache>/<version-id>/`.
pub fn version_cache_dir(cache_root: &Path, version_id: &str) -> PathBuf {
    cache_root.join(version_id)
}

/// The shared library cache root, `<cache>/libraries/`.
pub fn library_cache_root(cache_root: &Path) -> PathBuf {
    cache_root.join("libraries")
}
