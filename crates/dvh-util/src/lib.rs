//! Shared utilities for the Decompiled-Version Historian.
//!
//! Cross-cutting concerns used by every other `dvh-*` crate: a unified
//! error type, filesystem helpers, SHA-1 hashing, external-process
//! spawning, and terminal progress/status output.

pub mod errors;
pub mod fs;
pub mod hash;
pub mod process;
pub mod progress;

use std::path::PathBuf;

/// Root directory for all DVH user-level state (`~/.dvh/`).
///
/// Falls back to `.dvh` in the current directory if the home directory
/// cannot be determined, matching the "never hard-fail on missing HOME"
/// posture the rest of the pipeline takes toward ambient configuration.
pub fn dirs_path() -> PathBuf {
    dirs_home().join(".dvh")
}

fn dirs_home() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}
