//! Shell escape hatch for steps the fixture client does not model.

use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};

use mxfixture_config::ShellConfig;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("command timed out after {timeout:?}: {command}")]
    TimedOut { command: String, timeout: Duration },
    #[error("command terminated by a signal: {command}")]
    Signalled { command: String },
    #[error("shell command failed with exit code {exit_code}: {stderr}")]
    Failed { exit_code: i32, stderr: String },
}

/// Buffered outcome of one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

#[derive(Debug, Clone)]
pub struct CommandRunner {
    program: String,
    timeout: Duration,
}

impl CommandRunner {
    pub fn new(config: &ShellConfig) -> Self {
        Self {
            program: config.program.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run `command` through `{program} -c` and wait for it to exit.
    ///
    /// A non-zero exit status is not an error here, see [`Self::run_checked`].
    pub async fn run(&self, command: &str) -> Result<CommandResult, CommandError> {
        debug!(program = %self.program, %command, "running shell command");

        let child = Command::new(&self.program)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| CommandError::TimedOut {
                command: command.to_string(),
                timeout: self.timeout,
            })?
            .map_err(|source| CommandError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let exit_code = output.status.code().ok_or_else(|| CommandError::Signalled {
            command: command.to_string(),
        })?;

        Ok(CommandResult {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code,
        })
    }

    /// Like [`Self::run`], but a non-zero exit becomes [`CommandError::Failed`].
    ///
    /// Stderr from a successful command is only logged.
    pub async fn run_checked(&self, command: &str) -> Result<CommandResult, CommandError> {
        let result = self.run(command).await?;

        let stderr = result.stderr.trim();
        if !result.success() {
            warn!(exit_code = result.exit_code, %command, "shell command failed");
            return Err(CommandError::Failed {
                exit_code: result.exit_code,
                stderr: stderr.to_string(),
            });
        }

        if !stderr.is_empty() {
            info!(stderr = %stderr, "shell command wrote to stderr");
        }
        Ok(result)
    }
}
