//! The frozen build-time table of shipped tool hashes (spec §6 "Embedded
//! resources": `dependency_hashes.txt`), used by the fingerprint cache to
//! resolve [`dvh_fingerprint::FingerprintValue::Dependency`] labels without
//! re-hashing a tool's jar/binary on every run.
//!
//! Format: one `name=sha1` pair per line, `#`-comments allowed, identical to
//! the fingerprint file format itself.

use std::collections::HashMap;
use std::sync::OnceLock;

const RAW: &str = include_str!("../resources/dependency_hashes.txt");

static TABLE: OnceLock<HashMap<String, String>> = OnceLock::new();

fn table() -> &'static HashMap<String, String> {
    TABLE.get_or_init(|| parse(RAW))
}

fn parse(raw: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((name, hash)) = line.split_once('=') {
            map.insert(name.trim().to_string(), hash.trim().to_string());
        }
    }
    map
}

/// Look up the declared hash for a named bundled dependency (e.g.
/// `"vineflower"`, `"autorenamingtool"`, `"mergetool"`, `"bundler-extractor"`).
pub fn lookup(name: &str) -> Option<String> {
    table().get(name).cloned()
}

/// The well-known tool names this table is expected to carry entries for.
pub const REMAP_TOOL: &str = "autorenamingtool";
pub const MERGE_TOOL: &str = "mergetool";
pub const BUNDLER_EXTRACTOR: &str = "bundler-extractor";
pub const DECOMPILER: &str = "vineflower";
pub const DECOMPILER_PLUGINS: &str = "vineflower-plugins";
