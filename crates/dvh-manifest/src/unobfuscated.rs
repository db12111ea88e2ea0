//! Synthetic "unobfuscated" variants, built from a JSON file embedded in the
//! program image (spec §4.2), one entry per base version known to ship an
//! unobfuscated distribution alongside its regular one.
//!
//! The lazily-loaded map is one of the two process-wide mutable-state
//! points called out in spec §9; it is initialized once on first access via
//! [`std::sync::OnceLock`] and never mutated after.

use std::sync::OnceLock;

use serde::Deserialize;

use dvh_core::{VersionInfo, UNOBFUSCATED_SUFFIX};

const RAW: &str = include_str!("../resources/unobfuscated_variants.json");

#[derive(Debug, Clone, Deserialize)]
struct RawEntry {
    base: String,
    manifest_url: String,
}

static ENTRIES: OnceLock<Vec<RawEntry>> = OnceLock::new();

fn entries() -> &'static [RawEntry] {
    ENTRIES
        .get_or_init(|| serde_json::from_str(RAW).expect("embedded unobfuscated_variants.json is well-formed"))
        .as_slice()
}

/// The set of base-id strings that declare an unobfuscated variant.
pub fn base_ids_with_variant() -> impl Iterator<Item = &'static str> {
    entries().iter().map(|e| e.base.as_str())
}

/// Insert every declared synthetic variant into `versions`, immediately
/// after its matching base entry, so it compares as newer (spec §4.2).
/// Bases not present in `versions` are silently skipped — the catalogue may
/// not cover every historical id the embedded table knows about.
pub fn insert_synthetic_variants(versions: &mut Vec<VersionInfo>) {
    for entry in entries() {
        let Some(base_index) = versions
            .iter()
            .position(|v| v.id.as_str() == entry.base)
        else {
            continue;
        };
        let synthetic = VersionInfo::synthetic_unobfuscated_after(
            &versions[base_index],
            entry.manifest_url.clone(),
        );
        versions.insert(base_index + 1, synthetic);
    }
}

/// True if `id` (already suffix-stripped) is declared as having a synthetic
/// unobfuscated exclusion counterpart, i.e. the base id itself should be
/// excluded by default once its synthetic replacement exists — spec §4.3
/// step 2's "declared unobfuscated exclusions."
pub fn base_has_declared_exclusion(base_id: &str) -> bool {
    entries().iter().any(|e| e.base == base_id)
}

pub fn is_synthetic_variant_id(id: &str) -> bool {
    id.ends_with(UNOBFUSCATED_SUFFIX)
}
