//! The remap tool collaborator: rewrites class bytes so every referenced
//! identifier is substituted by its mapped form (spec §4.7, §9).

use std::path::Path;

use dvh_util::process::CommandBuilder;

/// Program name for the remap tool, overridable via `DVH_REMAP_TOOL` for
/// local testing against an alternate build.
fn program() -> String {
    std::env::var("DVH_REMAP_TOOL").unwrap_or_else(|_| "autorenamingtool".to_string())
}

/// Invoke the remap tool over `input_jar`, writing `output_jar`.
///
/// `mappings` is `None` for unobfuscated versions (no mappings pipeline
/// needed); `no_mod_manifest` and `no_dist_annotations` correspond to the
/// two flags spec §4.7 names explicitly. `extra_input` is the unobfuscated
/// path's second jar (spec §4.7 step 2: "directly feed client+extracted
/// server to the remap driver"), merged in by the tool itself rather than
/// the side-merger.
pub fn remap(
    input_jar: &Path,
    output_jar: &Path,
    mappings: Option<&Path>,
    extra_input: Option<&Path>,
    no_mod_manifest: bool,
    no_dist_annotations: bool,
) -> miette::Result<()> {
    let mut cmd = CommandBuilder::new(program())
        .arg("--input")
        .arg(input_jar.to_string_lossy().to_string())
        .arg("--output")
        .arg(output_jar.to_string_lossy().to_string())
        .silence_stdout();

    if let Some(extra) = extra_input {
        cmd = cmd.arg("--extra").arg(extra.to_string_lossy().to_string());
    }
    if let Some(mappings) = mappings {
        cmd = cmd.arg("--map").arg(mappings.to_string_lossy().to_string());
    }
    if no_mod_manifest {
        cmd = cmd.arg("--no-mod-manifest");
    }
    if no_dist_annotations {
        cmd = cmd.arg("--no-dist-annotations");
    }

    cmd.exec_checked("remap")?;
    Ok(())
}

/// The argument list this invocation would use, for fingerprinting —
/// mirrors exactly what [`remap`] passes, so a fingerprint computed before
/// the call matches what actually ran.
pub fn args(
    input_jar: &Path,
    output_jar: &Path,
    mappings: Option<&Path>,
    extra_input: Option<&Path>,
    no_mod_manifest: bool,
    no_dist_annotations: bool,
) -> Vec<String> {
    let mut args = vec![
        "--input".to_string(),
        input_jar.to_string_lossy().to_string(),
        "--output".to_string(),
        output_jar.to_string_lossy().to_string(),
    ];
    if let Some(extra) = extra_input {
        args.push("--extra".to_string());
        args.push(extra.to_string_lossy().to_string());
    }
    if let Some(mappings) = mappings {
        args.push("--map".to_string());
        args.push(mappings.to_string_lossy().to_string());
    }
    if no_mod_manifest {
        args.push("--no-mod-manifest".to_string());
    }
    if no_dist_annotations {
        args.push("--no-dist-annotations".to_string());
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn args_include_flags_when_set() {
        let a = args(
            &PathBuf::from("in.jar"),
            &PathBuf::from("out.jar"),
            Some(&PathBuf::from("m.tsrg")),
            None,
            true,
            true,
        );
        assert!(a.contains(&"--no-mod-manifest".to_string()));
        assert!(a.contains(&"--no-dist-annotations".to_string()));
        assert!(a.contains(&"m.tsrg".to_string()));
    }

    #[test]
    fn args_omit_mappings_when_none() {
        let a = args(
            &PathBuf::from("in.jar"),
            &PathBuf::from("out.jar"),
            None,
            None,
            true,
            false,
        );
        assert!(!a.iter().any(|s| s == "--map"));
    }

    #[test]
    fn args_include_extra_input_for_unobfuscated_merge() {
        let a = args(
            &PathBuf::from("client.jar"),
            &PathBuf::from("joined.jar"),
            None,
            Some(&PathBuf::from("server-extracted.jar")),
            true,
            false,
        );
        assert!(a.contains(&"--extra".to_string()));
        assert!(a.contains(&"server-extracted.jar".to_string()));
    }
}
