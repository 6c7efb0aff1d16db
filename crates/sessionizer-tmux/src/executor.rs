//! Subprocess execution of the tmux binary.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tracing::{debug, trace};

use crate::{Result, TmuxError};

/// Runs tmux with an argument vector.
///
/// Implementations only invoke the binary; they know nothing about the
/// records tmux prints.
pub trait CommandExecutor {
    /// Run tmux and return its captured standard output.
    ///
    /// A non-zero exit is reported as [`TmuxError::CommandFailed`] carrying
    /// standard error.
    fn run(&self, args: &[&str]) -> Result<String>;

    /// Run tmux connected to the caller's terminal (used for `attach`).
    fn run_attached(&self, args: &[&str]) -> Result<()> {
        self.run(args).map(|_| ())
    }
}

impl<E: CommandExecutor + ?Sized> CommandExecutor for &E {
    fn run(&self, args: &[&str]) -> Result<String> {
        (**self).run(args)
    }

    fn run_attached(&self, args: &[&str]) -> Result<()> {
        (**self).run_attached(args)
    }
}

/// The real tmux binary, located on PATH.
#[derive(Debug, Clone)]
pub struct TmuxCommand {
    /// Path to tmux binary.
    tmux_path: PathBuf,
}

impl TmuxCommand {
    /// Locate tmux on PATH.
    ///
    /// # Errors
    ///
    /// Returns `TmuxError::BinaryNotFound` if tmux is not available.
    pub fn new() -> Result<Self> {
        let tmux_path = which::which("tmux").map_err(|_| TmuxError::BinaryNotFound)?;
        debug!(path = %tmux_path.display(), "tmux found");
        Ok(Self { tmux_path })
    }

    /// Use an explicit tmux binary.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            tmux_path: path.into(),
        }
    }

    /// Check if tmux is available in PATH.
    pub fn is_available() -> bool {
        which::which("tmux").is_ok()
    }

    /// Path of the binary this executor runs.
    pub fn path(&self) -> &Path {
        &self.tmux_path
    }

    fn output(&self, args: &[&str]) -> Result<Output> {
        trace!(args = ?args, "running tmux command");
        let output = Command::new(&self.tmux_path).args(args).output()?;
        trace!(
            status = %output.status,
            stdout_len = output.stdout.len(),
            stderr_len = output.stderr.len(),
            "tmux command completed"
        );
        Ok(output)
    }
}

impl CommandExecutor for TmuxCommand {
    fn run(&self, args: &[&str]) -> Result<String> {
        let output = self.output(args)?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            Err(TmuxError::CommandFailed(stderr))
        }
    }

    fn run_attached(&self, args: &[&str]) -> Result<()> {
        trace!(args = ?args, "running tmux attached to terminal");
        let status = Command::new(&self.tmux_path).args(args).status()?;
        if status.success() {
            Ok(())
        } else {
            Err(TmuxError::CommandFailed(format!("tmux exited with {}", status)))
        }
    }
}
