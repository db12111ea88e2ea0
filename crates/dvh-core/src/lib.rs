//! Core data types for the Decompiled-Version Historian.
//!
//! Defines the fundamental records the rest of the pipeline operates over:
//! version identifiers and catalogue records, branch specifications,
//! repository state, canonical artifact filenames, and the global
//! (`~/.dvh/config.toml`) and per-run branch configuration files.
//!
//! This crate is intentionally free of network I/O and external-process
//! invocation — those live in `dvh-manifest`, `dvh-acquire`, `dvh-toolchain`.

pub mod artifact;
pub mod branch;
pub mod branch_config;
pub mod config;
pub mod detail;
pub mod identity;
pub mod repo_state;
pub mod version;

pub use artifact::ArtifactNames;
pub use branch::BranchSpec;
pub use detail::{DownloadDescriptor, DownloadKind, LibraryDescriptor, VersionDetail};
pub use identity::Identity;
pub use repo_state::{BranchMetadata, RepoState, METADATA_FILE, SCHEMA_VERSION};
pub use version::{VersionId, VersionInfo, VersionKind, UNOBFUSCATED_SUFFIX};
