//! Declarative branch specification (spec §3/§4.3).

use serde::{Deserialize, Serialize};

use crate::version::VersionId;

/// The three branch flavors. `Release` further restricts the filtered list
/// to release-kind ids; `Dev`/`Custom` differ only in name, not behavior —
/// the distinction is purely informational to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchType {
    Release,
    Dev,
    Custom,
}

/// A declarative description of which versions belong on a branch and in
/// what order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchSpec {
    #[serde(rename = "type")]
    pub branch_type: BranchType,
    #[serde(default)]
    pub start: Option<VersionId>,
    #[serde(default)]
    pub end: Option<VersionId>,
    /// When set, an exhaustive allowlist — `include`/`exclude` are ignored.
    #[serde(default)]
    pub versions: Option<Vec<VersionId>>,
    #[serde(default)]
    pub include: Vec<VersionId>,
    #[serde(default)]
    pub exclude: Vec<VersionId>,
}

impl BranchSpec {
    pub fn new(branch_type: BranchType) -> Self {
        Self {
            branch_type,
            start: None,
            end: None,
            versions: None,
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }
}
