use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandStatus {
    /// `None` when the process was ended by a signal.
    pub code: Option<i32>,
}

impl CommandStatus {
    pub fn exited(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn success(self) -> bool {
        self.code == Some(0)
    }
}

impl std::fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit status {code}"),
            None => f.write_str("terminated by signal"),
        }
    }
}

/// Runs an install-command bundle. Output is not inspected.
pub trait CommandRunner {
    fn run_script(&self, script: &str) -> Result<CommandStatus>;
}

/// Hands the script to `sh -c` with inherited stdio.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    shell: PathBuf,
}

impl ShellRunner {
    pub fn new(shell: impl Into<PathBuf>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new("sh")
    }
}

impl CommandRunner for ShellRunner {
    fn run_script(&self, script: &str) -> Result<CommandStatus> {
        debug!(shell = %self.shell.display(), "running install commands");
        let status = Command::new(&self.shell)
            .arg("-c")
            .arg(script)
            .status()
            .with_context(|| format!("failed to start {}", self.shell.display()))?;
        Ok(CommandStatus {
            code: status.code(),
        })
    }
}
