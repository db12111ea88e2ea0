//! Repository state and the initial-commit metadata file (spec §3 "RepoState",
//! §6 "Persistent on-disk layout" — `Snowblower.txt`).

use std::path::Path;

use dvh_util::errors::DvhError;

use crate::identity::Identity;

/// Current schema tag stamped into every freshly initialized branch's
/// metadata file. Bumping this forces a `MetadataMismatch` on branches
/// created by an older build, which is the mechanism by which
/// `--start-over-if-required` detects an incompatible branch.
pub const SCHEMA_VERSION: &str = "2";

/// Filename of the well-known initial-commit metadata file.
pub const METADATA_FILE: &str = "Snowblower.txt";

/// In-memory view of the repository driver's working state for the
/// current run.
#[derive(Debug, Clone)]
pub struct RepoState {
    pub branch: String,
    pub head: Option<String>,
    pub remote_name: Option<String>,
    pub committer: Identity,
}

/// Parsed contents of [`METADATA_FILE`]: the schema tag and start version
/// the branch was initialized with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchMetadata {
    pub version_id: String,
    pub start: String,
}

impl BranchMetadata {
    pub fn new(schema_version: impl Into<String>, start: impl Into<String>) -> Self {
        Self {
            version_id: schema_version.into(),
            start: start.into(),
        }
    }

    /// `key=value` form written into the initial commit, one pair per line.
    pub fn render(&self) -> String {
        format!("VersionId={}\nStart={}\n", self.version_id, self.start)
    }

    pub fn parse(text: &str) -> Result<Self, DvhError> {
        let mut version_id = None;
        let mut start = None;
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            match key.trim() {
                "VersionId" => version_id = Some(value.trim().to_string()),
                "Start" => start = Some(value.trim().to_string()),
                _ => {}
            }
        }
        match (version_id, start) {
            (Some(version_id), Some(start)) => Ok(Self { version_id, start }),
            _ => Err(DvhError::MetadataMismatch {
                message: format!("{METADATA_FILE} missing VersionId/Start fields"),
            }),
        }
    }

    /// True iff this matches the schema/start the current run expects.
    pub fn is_compatible(&self, start: &str) -> bool {
        self.version_id == SCHEMA_VERSION && self.start == start
    }
}

pub fn metadata_path(working_tree_root: &Path) -> std::path::PathBuf {
    working_tree_root.join(METADATA_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_and_parses_round_trip() {
        let meta = BranchMetadata::new(SCHEMA_VERSION, "1.14.4");
        let rendered = meta.render();
        let parsed = BranchMetadata::parse(&rendered).unwrap();
        assert_eq!(meta, parsed);
    }

    #[test]
    fn parse_ignores_comments_and_blank_lines() {
        let text = "# generated\nVersionId=2\n\nStart=1.15\n";
        let parsed = BranchMetadata::parse(text).unwrap();
        assert_eq!(parsed.version_id, "2");
        assert_eq!(parsed.start, "1.15");
    }

    #[test]
    fn parse_fails_when_fields_missing() {
        assert!(BranchMetadata::parse("VersionId=2\n").is_err());
    }

    #[test]
    fn is_compatible_checks_schema_and_start() {
        let meta = BranchMetadata::new(SCHEMA_VERSION, "1.14.4");
        assert!(meta.is_compatible("1.14.4"));
        assert!(!meta.is_compatible("1.15"));

        let stale = BranchMetadata::new("1", "1.14.4");
        assert!(!stale.is_compatible("1.14.4"));
    }
}
