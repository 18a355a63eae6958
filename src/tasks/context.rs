//! Shared task context, per-run flags and the state passed between tasks.
use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::config::Settings;
use crate::exec::Executor;
use crate::logging::Log;
use crate::migration::{BackupOptions, BackupRecord, ProjectProbes, ToolInventory};
use crate::operations::FileSystemOps;
use crate::resources::{Installer, PackageManagerProfile, RunOptions};

/// Asks the user whether a destructive step may proceed.
#[cfg_attr(test, mockall::automock)]
pub trait Confirm: Send + Sync + std::fmt::Debug {
    /// Returns `true` if the user agreed.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt cannot be shown (no terminal).
    fn confirm(&self, prompt: &str) -> anyhow::Result<bool>;
}

/// Interactive terminal prompt.
#[derive(Debug, Default)]
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> anyhow::Result<bool> {
        Ok(dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()?)
    }
}

/// Per-run switches of the `migrate` command.
#[derive(Debug, Clone, Default)]
pub struct MigrateFlags {
    /// Proceed with cleanup without prompting.
    pub yes: bool,
    /// Allow cleanup without a backup.
    pub skip_backup: bool,
    /// Replace existing scripts that differ.
    pub overwrite_scripts: bool,
    /// Packages protected from dependency removal, on top of the settings.
    pub keep: Vec<String>,
}

/// Shared, read-only context for task execution.
pub struct Context {
    /// Project root.
    pub root: PathBuf,
    /// Loaded settings.
    pub settings: Settings,
    /// Logging sink.
    pub log: Arc<dyn Log>,
    /// Subprocess runner.
    pub executor: Arc<dyn Executor>,
    /// Filesystem access.
    pub fs_ops: Arc<dyn FileSystemOps>,
    /// Interactive confirmation.
    pub confirm: Arc<dyn Confirm>,
    /// Global run options.
    pub opts: RunOptions,
    /// Command-specific switches.
    pub flags: MigrateFlags,
    /// Package manager for install and removal.
    pub profile: &'static PackageManagerProfile,
    /// Date stamped on backups and reports.
    pub today: NaiveDate,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("root", &self.root)
            .field("settings", &self.settings)
            .field("log", &"<dyn Log>")
            .field("executor", &"<dyn Executor>")
            .field("fs_ops", &"<dyn FileSystemOps>")
            .field("opts", &self.opts)
            .field("flags", &self.flags)
            .field("profile", &self.profile.id)
            .field("today", &self.today)
            .finish_non_exhaustive()
    }
}

impl Context {
    /// Installer bound to this context's profile, root and executor.
    #[must_use]
    pub fn installer(&self) -> Installer<'_> {
        Installer::new(
            self.profile,
            &self.root,
            self.executor.as_ref(),
            self.log.as_ref(),
        )
    }

    /// Backup location and layout from the settings.
    #[must_use]
    pub fn backup_options(&self) -> BackupOptions {
        BackupOptions {
            dir: self.settings.backup_dir_in(&self.root),
            prefix: self.settings.prefix.clone(),
            include_instructions: self.settings.backup_instructions,
        }
    }

    /// Settings keep-list plus the command-line keep-list.
    #[must_use]
    pub fn keep_list(&self) -> Vec<String> {
        let mut keep = self.settings.keep.clone();
        for name in &self.flags.keep {
            if !keep.contains(name) {
                keep.push(name.clone());
            }
        }
        keep
    }
}

/// State handed from one task to the next during a single run.
#[derive(Debug, Default)]
pub struct PipelineState {
    /// What detection found.
    pub inventory: ToolInventory,
    /// Project characteristics.
    pub probes: ProjectProbes,
    /// Snapshot written by this run.
    pub backup: Option<BackupRecord>,
    /// Whether cleanup was confirmed.
    pub confirmed: bool,
}

impl PipelineState {
    /// Why destructive tasks may not run yet, if they may not.
    #[must_use]
    pub fn cleanup_blocked(&self, ctx: &Context) -> Option<&'static str> {
        if !self.confirmed {
            Some("cleanup was not confirmed")
        } else if self.inventory.has_configs && self.backup.is_none() && !ctx.flags.skip_backup {
            Some("no backup was written for this run")
        } else {
            None
        }
    }
}
