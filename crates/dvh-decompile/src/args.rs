//! Fixed decompiler argument sets (spec §4.8). The universal set applies to
//! every version; the obfuscated-only set is appended when the version
//! being decompiled has no mappings of its own (its identifiers remain
//! short and synthetic, so the decompiler needs extra help making sense of
//! them).

/// Flags applied regardless of version kind.
pub fn universal_args() -> Vec<String> {
    vec![
        "--decompile-inner=true".to_string(),
        "--remove-bridge=true".to_string(),
        "--decompile-generics=true".to_string(),
        "--ascii-strings=true".to_string(),
        "--remove-synthetic=true".to_string(),
        "--include-classpath=true".to_string(),
        "--ignore-invalid-bytecode=true".to_string(),
        "--bytecode-source-mapping=true".to_string(),
        "--indent=4".to_string(),
        "--dump-code-lines=true".to_string(),
        "--log-level=ERROR".to_string(),
    ]
}

/// Flags added only for obfuscated versions.
pub fn obfuscated_only_args() -> Vec<String> {
    vec![
        "--jad-variable-naming=true".to_string(),
        "--rename-parameters=true".to_string(),
        "--disable-method-parameter-names=true".to_string(),
    ]
}

/// The full argument list for a single decompile invocation.
pub fn build(is_obfuscated: bool, library_config: &str, input_jar: &str, output_dir: &str) -> Vec<String> {
    let mut args = universal_args();
    if is_obfuscated {
        args.extend(obfuscated_only_args());
    }
    args.push(format!("-cfg={library_config}"));
    args.push(input_jar.to_string());
    args.push(output_dir.to_string());
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obfuscated_build_includes_extra_flags() {
        let args = build(true, "libs.cfg", "joined.jar", "out");
        assert!(args.iter().any(|a| a == "--jad-variable-naming=true"));
        assert!(args.contains(&"joined.jar".to_string()));
        assert!(args.contains(&"out".to_string()));
    }

    #[test]
    fn unobfuscated_build_omits_extra_flags() {
        let args = build(false, "libs.cfg", "joined.jar", "out");
        assert!(!args.iter().any(|a| a == "--jad-variable-naming=true"));
    }

    #[test]
    fn universal_args_cover_all_named_flags() {
        let args = universal_args();
        for flag in [
            "--decompile-inner=true",
            "--remove-bridge=true",
            "--decompile-generics=true",
            "--ascii-strings=true",
            "--remove-synthetic=true",
            "--include-classpath=true",
            "--ignore-invalid-bytecode=true",
            "--bytecode-source-mapping=true",
            "--indent=4",
            "--dump-code-lines=true",
        ] {
            assert!(args.iter().any(|a| a == flag), "missing {flag}");
        }
    }
}
