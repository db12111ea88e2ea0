//! The side-merger collaborator: joins a client and (extracted) server
//! archive into one obfuscated archive, annotating every class member with
//! its originating dist side (spec §4.7 step 3).

use std::path::Path;

use dvh_util::process::CommandBuilder;

fn program() -> String {
    std::env::var("DVH_MERGE_TOOL").unwrap_or_else(|_| "mergetool".to_string())
}

pub fn merge(client_jar: &Path, server_jar: &Path, output_jar: &Path) -> miette::Result<()> {
    CommandBuilder::new(program())
        .args(args(client_jar, server_jar, output_jar))
        .silence_stdout()
        .exec_checked("merge")?;
    Ok(())
}

pub fn args(client_jar: &Path, server_jar: &Path, output_jar: &Path) -> Vec<String> {
    vec![
        "--client".to_string(),
        client_jar.to_string_lossy().to_string(),
        "--server".to_string(),
        server_jar.to_string_lossy().to_string(),
        "--output".to_string(),
        output_jar.to_string_lossy().to_string(),
        "--annotate".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn args_reference_both_sides() {
        let a = args(
            &PathBuf::from("client.jar"),
            &PathBuf::from("server.jar"),
            &PathBuf::from("joined-obf.jar"),
        );
        assert!(a.contains(&"client.jar".to_string()));
        assert!(a.contains(&"server.jar".to_string()));
        assert!(a.contains(&"--annotate".to_string()));
    }
}
