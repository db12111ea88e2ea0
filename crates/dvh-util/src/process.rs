use std::collections::HashMap;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use crate::errors::DvhError;

/// Builder for constructing and executing external collaborator processes
/// (the remap tool, merge tool, bundler-extractor, and decompiler).
///
/// Provides a fluent API for setting the program, arguments, environment,
/// working directory, and whether the child's stdout should be silenced —
/// every external tool invocation in the pipeline redirects stdout to a
/// sink while letting stderr (and the driver's own stdout) through.
pub struct CommandBuilder {
    program: String,
    args: Vec<String>,
    env: HashMap<String, String>,
    cwd: Option<String>,
    silence_stdout: bool,
}

impl CommandBuilder {
    /// Create a new builder for the given program.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: HashMap::new(),
            cwd: None,
            silence_stdout: false,
        }
    }

    /// Append a single argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable for the child process.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Set the working directory for the child process.
    pub fn cwd(mut self, dir: impl Into<String>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Redirect the child's stdout to a sink, per §5/§9's "suppress stdout
    /// while preserving the driver's own stdout" requirement.
    pub fn silence_stdout(mut self) -> Self {
        self.silence_stdout = true;
        self
    }

    /// Execute the command and return its output.
    pub fn exec(&self) -> Result<Output, DvhError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        for (k, v) in &self.env {
            cmd.env(k, v);
        }
        if let Some(ref dir) = self.cwd {
            cmd.current_dir(Path::new(dir));
        }
        if self.silence_stdout {
            cmd.stdout(Stdio::null());
        }
        cmd.output().map_err(DvhError::from)
    }

    /// Execute and convert a non-zero exit into a [`DvhError::ToolFailure`]
    /// tagged with `tool_name`, following §7's "ToolFailure: external tool
    /// non-zero" error kind.
    pub fn exec_checked(&self, tool_name: &str) -> miette::Result<Output> {
        let output = self.exec()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DvhError::ToolFailure {
                tool: tool_name.to_string(),
                message: format!(
                    "exited with {}: {}",
                    output.status,
                    stderr.trim()
                ),
            }
            .into());
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_simple_command() {
        let output = CommandBuilder::new("echo").arg("hello").exec().unwrap();
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "hello");
    }

    #[test]
    fn builder_silences_stdout() {
        let output = CommandBuilder::new("echo")
            .arg("hello")
            .silence_stdout()
            .exec()
            .unwrap();
        assert!(output.status.success());
        assert!(output.stdout.is_empty());
    }

    #[test]
    fn builder_nonexistent_program() {
        assert!(CommandBuilder::new("nonexistent_program_xyz_123").exec().is_err());
    }

    #[test]
    fn exec_checked_reports_tool_failure() {
        let result = CommandBuilder::new("sh")
            .arg("-c")
            .arg("exit 3")
            .exec_checked("fake-tool");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("fake-tool"));
    }

    #[test]
    fn exec_checked_ok_on_success() {
        let result = CommandBuilder::new("true").exec_checked("true-tool");
        assert!(result.is_ok());
    }
}
