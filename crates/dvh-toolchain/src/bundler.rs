//! The server-bundler extraction collaborator and the manifest sniff that
//! decides whether it is needed (spec §4.7 step 1).

use std::io::Read;
use std::path::Path;

use dvh_util::errors::DvhError;
use dvh_util::process::CommandBuilder;

/// The manifest header Mojang's server-bundler jars carry. Its presence
/// means `server.jar` is a thin launcher wrapping the real server jar plus
/// its own library set, rather than the server classes themselves.
const BUNDLER_MANIFEST_HEADER: &str = "Main-Class: net.minecraft.bundler.Main";

fn program() -> String {
    std::env::var("DVH_BUNDLER_EXTRACTOR").unwrap_or_else(|_| "bundler-extractor".to_string())
}

/// True if `server_jar`'s manifest declares the bundler main class.
pub fn is_bundler(server_jar: &Path) -> Result<bool, DvhError> {
    let file = std::fs::File::open(server_jar).map_err(DvhError::Io)?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| DvhError::ToolFailure {
        tool: "zip-read".to_string(),
        message: format!("failed to open {}: {e}", server_jar.display()),
    })?;

    let mut entry = match archive.by_name("META-INF/MANIFEST.MF") {
        Ok(entry) => entry,
        Err(_) => return Ok(false),
    };
    let mut content = String::new();
    entry
        .read_to_string(&mut content)
        .map_err(DvhError::Io)?;
    Ok(content
        .lines()
        .any(|line| line.trim() == BUNDLER_MANIFEST_HEADER))
}

/// Invoke the bundler-extraction tool, writing the extracted server jar.
pub fn extract(server_jar: &Path, output_jar: &Path) -> miette::Result<()> {
    CommandBuilder::new(program())
        .args(args(server_jar, output_jar))
        .silence_stdout()
        .exec_checked("bundler-extract")?;
    Ok(())
}

pub fn args(server_jar: &Path, output_jar: &Path) -> Vec<String> {
    vec![
        "--input".to_string(),
        server_jar.to_string_lossy().to_string(),
        "--output".to_string(),
        output_jar.to_string_lossy().to_string(),
    ]
}
