//! Maps a top-level pipeline failure to a process exit code (spec §6).
//!
//! Every kind in spec §7 other than `MappingMissing` (handled internally as
//! a logged skip, never surfaced here) terminates the run; this module only
//! decides *which* nonzero code to report.

use dvh_util::errors::DvhError;

/// Dedicated nonzero codes per spec §6's "Exit codes" list, in the order
/// given there. `1` is reserved for errors this table doesn't name
/// specifically (network faults, I/O, tool invocation plumbing).
pub fn code_for(err: &DvhError) -> i32 {
    match err {
        DvhError::ArgumentError { .. } => 2,
        DvhError::ManifestUnavailable { .. } => 3,
        DvhError::BranchUnderspecified { .. } | DvhError::BranchMisordered { .. } | DvhError::PolicyExcluded { .. } => 4,
        DvhError::MappingMismatch { .. } => 5,
        DvhError::UnknownVersion { .. } => 6,
        DvhError::ResumeMismatch { .. } | DvhError::MetadataMismatch { .. } => 7,
        DvhError::PushFailed { .. } => 8,
        DvhError::ToolFailure { .. } => 9,
        DvhError::Network { .. } | DvhError::Io(_) | DvhError::Generic { .. } => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_error_is_code_two() {
        assert_eq!(
            code_for(&DvhError::ArgumentError {
                message: "bad flag".into()
            }),
            2
        );
    }

    #[test]
    fn push_failed_is_code_eight() {
        assert_eq!(
            code_for(&DvhError::PushFailed {
                message: "rejected".into()
            }),
            8
        );
    }

    #[test]
    fn generic_falls_back_to_one() {
        assert_eq!(
            code_for(&DvhError::Generic {
                message: "oops".into()
            }),
            1
        );
    }
}
