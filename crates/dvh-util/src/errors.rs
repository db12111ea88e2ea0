use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all DVH operations, one variant per §7 error kind.
#[derive(Debug, Error, Diagnostic)]
pub enum DvhError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CLI argument parse failure.
    #[error("Argument error: {message}")]
    ArgumentError { message: String },

    /// The upstream version catalogue could not be fetched or parsed.
    #[error("Manifest unavailable: {message}")]
    #[diagnostic(help("Check network connectivity and the catalogue URL"))]
    ManifestUnavailable { message: String },

    /// A start or end version id is not present in the catalogue.
    #[error("Unknown version: {id}")]
    UnknownVersion { id: String },

    /// A start or end version was filtered out by the branch spec.
    #[error("Version excluded by branch policy: {id}")]
    PolicyExcluded { id: String },

    /// Branch start is newer than branch end.
    #[error("Branch misordered: start {start} is newer than end {end}")]
    BranchMisordered { start: String, end: String },

    /// Neither start nor end could be derived from the branch spec.
    #[error("Branch underspecified: {message}")]
    BranchUnderspecified { message: String },

    /// Resume state could not be reconciled with the current plan.
    #[error("Resume mismatch: {message}")]
    ResumeMismatch { message: String },

    /// The initial commit's metadata file disagrees with the current schema/start.
    #[error("Metadata mismatch: {message}")]
    MetadataMismatch { message: String },

    /// Client mappings are not a strict superset of server mappings.
    #[error("Mapping mismatch: {message}")]
    MappingMismatch { message: String },

    /// An external collaborator process (remap/merge/bundler/decompiler) exited non-zero.
    #[error("Tool failure ({tool}): {message}")]
    ToolFailure { tool: String, message: String },

    /// The remote rejected a push with a non-OK, non-up-to-date status.
    #[error("Push failed: {message}")]
    PushFailed { message: String },

    /// Network request or download failed.
    #[error("Network error: {message}")]
    Network { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

/// Convenience alias for `miette::Result<T>`.
pub type DvhResult<T> = miette::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err = DvhError::from(io_err);
        assert!(err.to_string().contains("I/O error"), "got: {err}");
    }

    #[test]
    fn tool_failure_display() {
        let err = DvhError::ToolFailure {
            tool: "decompiler".into(),
            message: "exit code 1".into(),
        };
        assert_eq!(err.to_string(), "Tool failure (decompiler): exit code 1");
    }

    #[test]
    fn branch_misordered_display() {
        let err = DvhError::BranchMisordered {
            start: "1.18".into(),
            end: "1.16".into(),
        };
        assert_eq!(
            err.to_string(),
            "Branch misordered: start 1.18 is newer than end 1.16"
        );
    }

    #[test]
    fn generic_display_is_bare_message() {
        let err = DvhError::Generic {
            message: "something broke".into(),
        };
        assert_eq!(err.to_string(), "something broke");
    }
}
