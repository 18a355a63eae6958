//! Subprocess execution behind an injectable [`Executor`] trait.
use anyhow::{Context, Result};
use std::path::Path;
use std::process::{Command, Output, Stdio};

/// Result of a command execution.
#[derive(Debug, Clone, Default)]
pub struct ExecResult {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Whether the process exited successfully.
    pub success: bool,
    /// Exit code, absent when killed by a signal.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Where a child process writes its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Capture stdout/stderr; nothing reaches the terminal.
    Captured,
    /// Stream stdout/stderr straight to the terminal.
    Inherited,
}

/// Abstraction over process spawning so installers can be tested without
/// touching a real package manager.
#[cfg_attr(test, mockall::automock)]
pub trait Executor: Send + Sync + std::fmt::Debug {
    /// Run a command in `dir` without bailing on a non-zero exit.
    ///
    /// # Errors
    ///
    /// Returns an error only if the process cannot be spawned.
    fn run_in_unchecked(
        &self,
        dir: &Path,
        program: &str,
        args: &[String],
        mode: OutputMode,
    ) -> Result<ExecResult>;

    /// Check if a program is available on PATH.
    fn which(&self, program: &str) -> bool;
}

/// Production [`Executor`] that spawns real processes.
#[derive(Debug, Default)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn run_in_unchecked(
        &self,
        dir: &Path,
        program: &str,
        args: &[String],
        mode: OutputMode,
    ) -> Result<ExecResult> {
        let mut cmd = Command::new(program);
        cmd.args(args).current_dir(dir).stdin(Stdio::null());
        match mode {
            OutputMode::Captured => {
                let output = cmd
                    .output()
                    .with_context(|| format!("failed to execute: {program}"))?;
                Ok(ExecResult::from(output))
            }
            OutputMode::Inherited => {
                let status = cmd
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit())
                    .status()
                    .with_context(|| format!("failed to execute: {program}"))?;
                Ok(ExecResult {
                    success: status.success(),
                    code: status.code(),
                    ..ExecResult::default()
                })
            }
        }
    }

    fn which(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}
