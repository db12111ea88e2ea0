//! CLI argument definitions for the Decompiled-Version Historian.
//!
//! DVH exposes a single top-level command surface (spec §6) rather than a
//! family of subcommands — one invocation resolves the catalogue, plans a
//! version range, and drives the whole pipeline through to a commit.

use clap::{CommandFactory, Parser};

#[derive(Parser, Debug)]
#[command(
    name = "dvh",
    version,
    about = "Builds a version-control history of fully-decompiled snapshots of a binary distribution",
    long_about = "The Decompiled-Version Historian resolves a manifest of upstream releases, \
                  merges and remaps each one against its name mappings, decompiles it, and \
                  commits the result on a chosen branch so successive versions are diffable."
)]
pub struct Cli {
    /// Output directory containing (or to contain) the working tree and its git repository.
    #[arg(long)]
    pub output: std::path::PathBuf,

    /// Cache directory for per-version and shared-library artifacts.
    #[arg(long, default_value = "./cache")]
    pub cache: std::path::PathBuf,

    /// Directory of pre-supplied mappings, tried before upstream download.
    #[arg(long = "extra-mappings")]
    pub extra_mappings: Option<std::path::PathBuf>,

    /// Version to start the branch at. Defaults to the branch spec's own default.
    #[arg(long = "start-ver")]
    pub start_ver: Option<String>,

    /// Version to end the branch at, or the literal `latest`. Defaults to `latest`.
    #[arg(long = "target-ver", default_value = "latest")]
    pub target_ver: String,

    /// Name of the branch to generate.
    #[arg(long, default_value = "main")]
    pub branch: String,

    /// Remote URL to provision, fetch from, and optionally push to.
    #[arg(long)]
    pub remote: Option<String>,

    /// Check out the remote tracking branch if the remote already has it.
    #[arg(long)]
    pub checkout: bool,

    /// Push generated commits to the remote in batches (spec §4.10).
    #[arg(long)]
    pub push: bool,

    /// Delete and recreate the branch unconditionally before generating.
    #[arg(long = "start-over")]
    pub start_over: bool,

    /// Delete and recreate the branch automatically on a resume/metadata mismatch.
    #[arg(long = "start-over-if-required")]
    pub start_over_if_required: bool,

    /// Delete client/server/server-extracted archives immediately after `joined.jar` is produced.
    #[arg(long = "partial-cache")]
    pub partial_cache: bool,

    /// Restrict the branch to release-kind versions only.
    #[arg(long = "releases-only")]
    pub releases_only: bool,

    /// Glob of archive-relative paths to include in the synced working tree (repeatable).
    #[arg(long = "include")]
    pub include: Vec<String>,

    /// Glob of archive-relative paths to exclude from the synced working tree (repeatable).
    #[arg(long = "exclude")]
    pub exclude: Vec<String>,

    /// Branch config file URI, `file://` or `https://` (repeatable, last-wins by branch name).
    #[arg(long = "cfg")]
    pub cfg: Vec<String>,

    /// Enable verbose (debug-level) logging regardless of `RUST_LOG`.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parse `argv`, with the spec's one deviation from clap's own default: a
/// zero-argument invocation prints help (not a "missing required argument"
/// error), since `--output` would otherwise make that a nonzero-exit error.
pub fn parse() -> Cli {
    if std::env::args_os().len() <= 1 {
        Cli::command().print_help().expect("help renders");
        println!();
        std::process::exit(0);
    }
    Cli::parse()
}
