//! Committer identity used for every generated commit (spec §6).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

impl Identity {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// The fixed identity DVH uses unless overridden by
    /// [`crate::config::GlobalConfig`].
    pub fn default_committer() -> Self {
        Self::new("Decompiled-Version Historian", "dvh@users.noreply.github.com")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_committer_is_stable() {
        let a = Identity::default_committer();
        let b = Identity::default_committer();
        assert_eq!(a, b);
    }
}
