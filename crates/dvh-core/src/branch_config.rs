//! Branch config files: `{branches: {<name>: BranchSpec}}`, loaded from
//! `--cfg` `file://` or `https://` URIs and composed last-wins over branch
//! name (spec §6).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::branch::BranchSpec;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BranchConfigFile {
    #[serde(default)]
    pub branches: BTreeMap<String, BranchSpec>,
}

impl BranchConfigFile {
    pub fn parse(json: &str) -> miette::Result<Self> {
        serde_json::from_str(json).map_err(|e| {
            dvh_util::errors::DvhError::Generic {
                message: format!("Failed to parse branch config: {e}"),
            }
            .into()
        })
    }
}

/// Merge a sequence of branch config files into one table, later files
/// overriding earlier ones by branch name.
pub fn compose(files: impl IntoIterator<Item = BranchConfigFile>) -> BTreeMap<String, BranchSpec> {
    let mut merged = BTreeMap::new();
    for file in files {
        for (name, spec) in file.branches {
            merged.insert(name, spec);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_branch_config() {
        let json = r#"{
            "branches": {
                "release": {"type": "release", "start": "1.14.4"}
            }
        }"#;
        let file = BranchConfigFile::parse(json).unwrap();
        assert!(file.branches.contains_key("release"));
    }

    #[test]
    fn compose_is_last_wins_by_branch_name() {
        let a = BranchConfigFile::parse(
            r#"{"branches": {"release": {"type": "release", "start": "1.14.4"}}}"#,
        )
        .unwrap();
        let b = BranchConfigFile::parse(
            r#"{"branches": {"release": {"type": "release", "start": "1.16"}}}"#,
        )
        .unwrap();
        let merged = compose([a, b]);
        assert_eq!(
            merged.get("release").unwrap().start.as_ref().unwrap().as_str(),
            "1.16"
        );
    }

    #[test]
    fn compose_keeps_distinct_branch_names() {
        let a =
            BranchConfigFile::parse(r#"{"branches": {"release": {"type": "release"}}}"#).unwrap();
        let b = BranchConfigFile::parse(r#"{"branches": {"dev": {"type": "dev"}}}"#).unwrap();
        let merged = compose([a, b]);
        assert_eq!(merged.len(), 2);
    }
}
