//! The four external-tool collaborators treated as black boxes by the rest
//! of the pipeline: the jar remapper, the client/server class merger, the
//! server-bundler extractor, and the Java decompiler (spec §1, §9).
//!
//! Each is a thin wrapper over [`dvh_util::process::CommandBuilder`] that
//! owns only its documented command-line contract; none of them interprets
//! its own output beyond exit status. The [`dependency_hashes`] table backs
//! the fingerprint cache's `Dependency` value kind.

pub mod bundler;
pub mod decompile;
pub mod dependency_hashes;
pub mod merge;
pub mod remap;
