//! Version identifiers and catalogue records.
//!
//! A [`VersionId`] is an opaque identifier whose [`VersionKind`] is inferred
//! from its lexical form: release (`\d+\.\d+(\.\d+)?`), snapshot (one of
//! several date/pre-release/rc patterns), or special (anything else). An id
//! suffixed `_unobfuscated` is a synthetic variant of its stripped base.

use std::fmt;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Suffix marking a synthetic "unobfuscated" variant of a base version.
pub const UNOBFUSCATED_SUFFIX: &str = "_unobfuscated";

static RELEASE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\d+(\.\d+)?$").unwrap());

// `YYwWWc` weekly snapshot, `X.Y Pre-Release N`, `X.Y-rcN`, `X.Y-preN`,
// `X.Y-snapshot-N`.
static SNAPSHOT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?ix)
        ^\d{2}w\d{2}[a-z]$
        |^\d+\.\d+(\.\d+)?\s+Pre-Release\s+\d+$
        |^\d+\.\d+(\.\d+)?-rc\d+$
        |^\d+\.\d+(\.\d+)?-pre\d+$
        |^\d+\.\d+(\.\d+)?-snapshot-\d+$
        ",
    )
    .unwrap()
});

/// The lexical category a [`VersionId`] falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionKind {
    Release,
    Snapshot,
    Special,
}

impl VersionKind {
    /// Classify a raw version string (with any `_unobfuscated` suffix
    /// already stripped) by its canonical regex.
    pub fn classify(raw: &str) -> Self {
        if RELEASE_RE.is_match(raw) {
            VersionKind::Release
        } else if SNAPSHOT_RE.is_match(raw) {
            VersionKind::Snapshot
        } else {
            VersionKind::Special
        }
    }
}

impl fmt::Display for VersionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VersionKind::Release => "release",
            VersionKind::Snapshot => "snapshot",
            VersionKind::Special => "special",
        })
    }
}

/// An opaque version identifier. Equality and hashing are over the raw
/// string, matching the data model in spec §3.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionId(String);

impl VersionId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if this id carries the synthetic-unobfuscated suffix.
    pub fn is_unobfuscated_variant(&self) -> bool {
        self.0.ends_with(UNOBFUSCATED_SUFFIX)
    }

    /// The base id with any `_unobfuscated` suffix stripped. Returns a
    /// borrowed slice for the common (non-variant) case.
    pub fn base_str(&self) -> &str {
        self.0
            .strip_suffix(UNOBFUSCATED_SUFFIX)
            .unwrap_or(&self.0)
    }

    /// The [`VersionKind`] inferred from the base id's lexical form.
    pub fn kind(&self) -> VersionKind {
        VersionKind::classify(self.base_str())
    }
}

impl PartialEq for VersionId {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl std::hash::Hash for VersionId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VersionId {
    fn from(s: &str) -> Self {
        VersionId::new(s)
    }
}

impl From<String> for VersionId {
    fn from(s: String) -> Self {
        VersionId::new(s)
    }
}

/// A single entry in the upstream version catalogue.
///
/// `priority` disambiguates two records sharing the same [`VersionId`]; a
/// synthetic unobfuscated variant is inserted immediately after its base
/// version with a strictly greater priority so it compares as newer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub id: VersionId,
    pub kind: VersionKind,
    pub manifest_url: String,
    pub time_created: DateTime<Utc>,
    pub time_released: DateTime<Utc>,
    pub manifest_hash: Option<String>,
    pub priority: i64,
}

impl VersionInfo {
    /// Construct the synthetic unobfuscated variant that sits immediately
    /// after `base` in list order, per spec §4.2.
    pub fn synthetic_unobfuscated_after(base: &VersionInfo, manifest_url: String) -> VersionInfo {
        VersionInfo {
            id: VersionId::new(format!("{}{}", base.id.as_str(), UNOBFUSCATED_SUFFIX)),
            kind: base.kind,
            manifest_url,
            time_created: base.time_created,
            time_released: base.time_released,
            manifest_hash: None,
            priority: base.priority + 1,
        }
    }
}
