//! Artifact acquirer (AA): concurrent per-version download of mappings,
//! client/server archives, and library dependencies (spec §4.5).

pub mod client;
pub mod download;
pub mod libraries;
pub mod mappings;
pub mod pool;
pub mod version;

pub use client::build_client;
pub use pool::{acquire_all, acquire_all_with, AcquireOptions, VersionWork};
