//! Batched package operations through a resolved [`PackageManagerProfile`].
use std::path::Path;

use super::RunOptions;
use super::package_manager::PackageManagerProfile;
use crate::error::{MigrationError, Result};
use crate::exec::{Executor, OutputMode};
use crate::logging::Log;

/// What happened to one batch invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// The command ran and exited successfully.
    Completed,
    /// Dry run: the command was logged but not spawned.
    DryRun,
    /// Nothing to do (empty package list).
    Skipped,
    /// The command failed and `force` downgraded the failure to a warning.
    Failed {
        /// Exit status and stderr, or the spawn failure.
        reason: String,
    },
}

/// Runs install/add/remove/dlx batches in the project root.
#[derive(Debug)]
pub struct Installer<'a> {
    profile: &'static PackageManagerProfile,
    root: &'a Path,
    executor: &'a dyn Executor,
    log: &'a dyn Log,
}

impl<'a> Installer<'a> {
    /// Create an installer for the project at `root`.
    #[must_use]
    pub const fn new(
        profile: &'static PackageManagerProfile,
        root: &'a Path,
        executor: &'a dyn Executor,
        log: &'a dyn Log,
    ) -> Self {
        Self {
            profile,
            root,
            executor,
            log,
        }
    }

    /// The profile whose command templates this installer uses.
    #[must_use]
    pub const fn profile(&self) -> &'static PackageManagerProfile {
        self.profile
    }

    /// Add `packages` in one invocation, as dev dependencies when `dev` is set.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError::ExternalService`] if the command fails and
    /// `opts.force` is not set.
    pub fn add(&self, packages: &[String], dev: bool, opts: RunOptions) -> Result<BatchOutcome> {
        if packages.is_empty() {
            return Ok(BatchOutcome::Skipped);
        }
        let label = if dev {
            "add dev dependencies"
        } else {
            "add dependencies"
        };
        self.execute(label, &self.profile.add_command(packages, dev), opts)
    }

    /// Remove `packages` in one invocation.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError::ExternalService`] if the command fails and
    /// `opts.force` is not set.
    pub fn remove(&self, packages: &[String], opts: RunOptions) -> Result<BatchOutcome> {
        if packages.is_empty() {
            return Ok(BatchOutcome::Skipped);
        }
        self.execute(
            "remove dependencies",
            &self.profile.remove_command(packages),
            opts,
        )
    }

    /// Bare install of everything the manifest declares.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError::ExternalService`] if the command fails and
    /// `opts.force` is not set.
    pub fn install(&self, frozen: bool, opts: RunOptions) -> Result<BatchOutcome> {
        self.execute("install", &self.profile.install_command(frozen), opts)
    }

    /// Run a tool's own command (e.g. `init`) through the dlx prefix.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError::ExternalService`] if the command fails and
    /// `opts.force` is not set.
    pub fn dlx(&self, argv: &[String], opts: RunOptions) -> Result<BatchOutcome> {
        if argv.is_empty() {
            return Ok(BatchOutcome::Skipped);
        }
        self.execute("run", &self.profile.dlx_command(argv), opts)
    }

    fn execute(&self, label: &str, argv: &[String], opts: RunOptions) -> Result<BatchOutcome> {
        let command_line = argv.join(" ");
        let Some((program, args)) = argv.split_first() else {
            return Ok(BatchOutcome::Skipped);
        };

        if opts.dry_run {
            self.log.dry_run(&format!("would {label}: {command_line}"));
            return Ok(BatchOutcome::DryRun);
        }

        if !opts.silent {
            self.log.info(&format!("{label}: {command_line}"));
        }

        let failure = if self.executor.which(program) {
            let mode = if opts.silent {
                OutputMode::Captured
            } else {
                OutputMode::Inherited
            };
            match self
                .executor
                .run_in_unchecked(self.root, program, args, mode)
            {
                Ok(result) if result.success => {
                    self.log.debug(&format!("{command_line}: ok"));
                    return Ok(BatchOutcome::Completed);
                }
                Ok(result) => format!(
                    "exit {}: {}",
                    result.code.unwrap_or(-1),
                    result.stderr.trim()
                )
                .trim_end_matches([':', ' '])
                .to_string(),
                Err(e) => format!("{e:#}"),
            }
        } else {
            format!("'{program}' was not found on PATH")
        };

        if opts.force {
            self.log
                .warn(&format!("{command_line} failed ({failure}); continuing"));
            Ok(BatchOutcome::Failed { reason: failure })
        } else {
            Err(MigrationError::ExternalService {
                command: command_line,
                reason: failure,
            })
        }
    }
}
