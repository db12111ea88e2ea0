//! Include/exclude glob filtering over archive-relative paths, grounded on
//! `abp_glob::IncludeExcludeGlobs`'s exclude-takes-precedence matcher (spec
//! §4.9 step 2: "Apply include/exclude glob filters... non-matching entries
//! are skipped").

use globset::{Glob, GlobSet, GlobSetBuilder};

use dvh_util::errors::DvhError;

/// Compiled include/exclude glob pair. An empty include list means "every
/// path passes the include gate"; exclude always takes precedence.
pub struct PathFilter {
    include: Option<GlobSet>,
    exclude: Option<GlobSet>,
}

impl PathFilter {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self, DvhError> {
        Ok(Self {
            include: build(include)?,
            exclude: build(exclude)?,
        })
    }

    /// True if `path` should be processed: not excluded, and either no
    /// include patterns are set or one matches.
    pub fn allows(&self, path: &str) -> bool {
        if self.exclude.as_ref().is_some_and(|set| set.is_match(path)) {
            return false;
        }
        self.include.as_ref().is_none_or(|set| set.is_match(path))
    }
}

fn build(patterns: &[String]) -> Result<Option<GlobSet>, DvhError> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| DvhError::ArgumentError {
            message: format!("invalid glob pattern '{pattern}': {e}"),
        })?;
        builder.add(glob);
    }
    builder.build().map(Some).map_err(|e| DvhError::ArgumentError {
        message: format!("failed to compile glob set: {e}"),
    })
}
