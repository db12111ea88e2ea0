//! The decompiler collaborator. Argument assembly (the universal vs.
//! obfuscated-only flag sets) lives in `dvh-decompile`; this module only
//! owns the actual process invocation contract, mirroring how `remap` and
//! `merge` are split between "what to pass" and "how to run it."

use std::path::Path;

use dvh_util::process::CommandBuilder;

fn program() -> String {
    std::env::var("DVH_DECOMPILER").unwrap_or_else(|_| "vineflower".to_string())
}

/// Run the decompiler with an already-assembled argument list, redirecting
/// stdout to a sink and its severity threshold already folded into `args`
/// by the caller (spec §4.8: "stdout is silenced... severity threshold is
/// set to ERROR").
pub fn run(args: &[String], working_dir: &Path) -> miette::Result<()> {
    CommandBuilder::new(program())
        .args(args.to_vec())
        .cwd(working_dir.to_string_lossy().to_string())
        .silence_stdout()
        .exec_checked("decompile")?;
    Ok(())
}
