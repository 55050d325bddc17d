//! Subprocess plumbing for talking to git.
//!
//! All history data comes from the `git` binary rather than a reimplementation
//! of its storage format. Commands go through the [`CommandRunner`] trait so
//! that everything built on top can be exercised in tests with a fake runner
//! instead of a real repository.

use std::{path::PathBuf, process::Command};

use thiserror::Error;

/// Failure modes of an external command invocation.
///
/// Carries the rendered command line so that log output and error messages
/// name the command that failed, and the exit status when the process ran
/// to completion.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The process could not be started at all.
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The process ran but exited non-zero (or was killed by a signal,
    /// in which case `status` is `None`).
    #[error("`{command}` exited with status {}{}", display_status(.status), display_stderr(.stderr))]
    Failed {
        command: String,
        status: Option<i32>,
        stderr: String,
    },

    /// The process produced output that is not valid UTF-8.
    #[error("`{command}` produced non-UTF-8 output")]
    InvalidUtf8 { command: String },
}

fn display_status(status: &Option<i32>) -> String {
    status.map_or_else(|| "unknown".to_string(), |code| code.to_string())
}

fn display_stderr(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

/// Render a command slice the way a shell would show it.
fn render_command(cmd: &[&str]) -> String {
    cmd.join(" ")
}

/// Seam for running external commands and capturing their output.
///
/// The single production implementation is [`GitRunner`]; tests substitute
/// a counting fake so no subprocess is spawned.
pub trait CommandRunner {
    /// Run `cmd` and return its captured standard output.
    ///
    /// # Errors
    ///
    /// Returns a [`CommandError`] if the process cannot be spawned, exits
    /// non-zero, or prints non-UTF-8 output.
    fn output(&self, cmd: &[&str]) -> Result<String, CommandError>;
}

/// Runs commands synchronously in a fixed working directory.
///
/// Captured standard output has its trailing newline(s) stripped; everything
/// else, including leading whitespace, is returned as produced.
pub struct GitRunner {
    /// Directory the command runs in (the project root).
    cwd: PathBuf,
}

impl GitRunner {
    #[must_use]
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self { cwd: cwd.into() }
    }
}

impl CommandRunner for GitRunner {
    fn output(&self, cmd: &[&str]) -> Result<String, CommandError> {
        let Some((program, args)) = cmd.split_first() else {
            return Err(CommandError::Spawn {
                command: String::new(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "empty command line",
                ),
            });
        };

        let output = Command::new(program)
            .args(args)
            .current_dir(&self.cwd)
            .output()
            .map_err(|source| CommandError::Spawn {
                command: render_command(cmd),
                source,
            })?;

        if !output.status.success() {
            return Err(CommandError::Failed {
                command: render_command(cmd),
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            });
        }

        let text = String::from_utf8(output.stdout).map_err(|_| CommandError::InvalidUtf8 {
            command: render_command(cmd),
        })?;

        Ok(text.trim_end_matches(['\r', '\n']).to_string())
    }
}
