//! Decompiler driver (DD): invokes the decompiler over `joined.jar` with a
//! fixed argument set and a library classpath config file, short-circuited
//! by a content-addressed fingerprint (spec §4.8).

pub mod args;
pub mod classpath;

use std::path::{Path, PathBuf};

use dvh_core::ArtifactNames;
use dvh_fingerprint::FingerprintKey;
use dvh_util::errors::DvhError;

/// Run the decompiler stage, writing `joined-decompiled.jar` under
/// `version_dir` unless the fingerprint shows the prior output still
/// matches `joined_jar` and the shared library set.
pub fn run(
    version_dir: &Path,
    library_cache_root: &Path,
    joined_jar: &Path,
    is_obfuscated: bool,
) -> Result<PathBuf, DvhError> {
    let output_jar = version_dir.join(ArtifactNames::JOINED_DECOMPILED_JAR);
    let cache_file = version_dir.join(ArtifactNames::cache_sidecar(ArtifactNames::JOINED_DECOMPILED_JAR));
    let config_path = version_dir.join("libraries.cfg");

    let libraries = classpath::enumerate_libraries(library_cache_root)?;
    let args_list = args::build(
        is_obfuscated,
        &config_path.to_string_lossy(),
        &joined_jar.to_string_lossy(),
        &output_jar.to_string_lossy(),
    );

    let mut key = FingerprintKey::new();
    key.put_dependency("decompiler", dvh_toolchain::dependency_hashes::DECOMPILER);
    key.put_dependency(
        "decompiler-plugins",
        dvh_toolchain::dependency_hashes::DECOMPILER_PLUGINS,
    );
    key.put_path("joined-jar", joined_jar);
    key.put_literal("args", args_list.join(" "));
    for lib in &libraries {
        let label = lib
            .strip_prefix(library_cache_root)
            .unwrap_or(lib)
            .to_string_lossy()
            .replace('\\', "/");
        key.put_path(format!("lib:{label}"), lib.clone());
    }

    if output_jar.is_file()
        && key
            .is_valid(&cache_file, None, &dvh_toolchain::dependency_hashes::lookup)
            .unwrap_or(false)
    {
        return Ok(output_jar);
    }

    classpath::write_config(&libraries, &config_path)?;

    dvh_toolchain::decompile::run(&args_list, version_dir).map_err(|e| DvhError::ToolFailure {
        tool: "decompile".to_string(),
        message: e.to_string(),
    })?;

    key.write(&cache_file, &dvh_toolchain::dependency_hashes::lookup)?;
    Ok(output_jar)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn builds_args_and_config_when_no_cache() {
        let tmp = TempDir::new().unwrap();
        let version_dir = tmp.path().join("1.20.1");
        std::fs::create_dir_all(&version_dir).unwrap();
        let joined = version_dir.join(ArtifactNames::JOINED_JAR);
        std::fs::write(&joined, b"jarbytes").unwrap();

        let lib_root = tmp.path().join("libraries");
        std::fs::create_dir_all(lib_root.join("com/example/1.0")).unwrap();
        std::fs::write(lib_root.join("com/example/1.0/example-1.0.jar"), b"lib").unwrap();

        std::env::set_var("DVH_DECOMPILER", "true");
        let result = run(&version_dir, &lib_root, &joined, false);
        std::env::remove_var("DVH_DECOMPILER");

        assert!(result.is_ok());
        assert!(version_dir.join("libraries.cfg").is_file());
        let cfg_text = std::fs::read_to_string(version_dir.join("libraries.cfg")).unwrap();
        assert!(cfg_text.contains("-e="));
    }
}
