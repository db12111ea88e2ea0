//! Global user configuration loaded from `~/.dvh/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::identity::Identity;

/// Global configuration; every field is an override of a hard-coded
/// default and absent unless the operator has set it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub committer: Option<Identity>,

    #[serde(default)]
    pub acquire: AcquireConfig,
}

/// Cache-root override from `[cache]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_dir")]
    pub dir: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
        }
    }
}

fn default_cache_dir() -> String {
    "./cache".to_string()
}

/// Artifact acquirer worker-pool tuning from `[acquire]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcquireConfig {
    /// Overrides the default (logical CPU count) worker-pool size.
    #[serde(default)]
    pub workers: Option<u32>,
    /// Overrides the default 10-minute per-run acquisition timeout.
    #[serde(default, rename = "timeout-secs")]
    pub timeout_secs: Option<u64>,
}

impl Default for AcquireConfig {
    fn default() -> Self {
        Self {
            workers: None,
            timeout_secs: None,
        }
    }
}

impl GlobalConfig {
    /// Load from `~/.dvh/config.toml`, or return defaults if absent.
    pub fn load() -> miette::Result<Self> {
        let path = Self::default_path();
        if path.is_file() {
            let content = std::fs::read_to_string(&path).map_err(|e| {
                dvh_util::errors::DvhError::Generic {
                    message: format!("Failed to read global config: {e}"),
                }
            })?;
            toml::from_str(&content).map_err(|e| {
                dvh_util::errors::DvhError::Generic {
                    message: format!("Failed to parse global config: {e}"),
                }
                .into()
            })
        } else {
            Ok(Self::default())
        }
    }

    pub fn default_path() -> PathBuf {
        dvh_util::dirs_path().join("config.toml")
    }
}
