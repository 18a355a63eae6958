//! Top-level subcommand orchestration.
pub mod clean;
pub mod detect;
pub mod migrate;
pub mod version;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::config::Settings;
use crate::error::MigrationError;
use crate::exec::SystemExecutor;
use crate::logging::Log;
use crate::operations::{FileSystemOps, SystemFileSystemOps};
use crate::resources::package_manager::{self, PackageManagerProfile};
use crate::resources::RunOptions;
use crate::tasks::{Context, MigrateFlags, TerminalConfirm};

/// Version string baked in at build time.
#[must_use]
pub fn version() -> &'static str {
    option_env!("CONFIGSHIFT_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Shared state produced by the common command setup sequence.
#[derive(Debug)]
pub struct CommandSetup {
    /// Resolved project root.
    pub root: PathBuf,
    /// Settings loaded for the project.
    pub settings: Settings,
    /// Package manager chosen for the project.
    pub profile: &'static PackageManagerProfile,
}

impl CommandSetup {
    /// Resolve the project root, load settings and pick the package manager.
    ///
    /// # Errors
    ///
    /// Returns an error if the root is not a directory or the settings file
    /// is missing or invalid.
    pub fn init(global: &GlobalOpts, fs: &dyn FileSystemOps, log: &dyn Log) -> Result<Self> {
        let root = resolve_root(global)?;
        log.debug(&format!("project root: {}", root.display()));

        let settings = Settings::load(fs, &root, global.config.as_deref())
            .context("loading settings")?;
        let profile = package_manager::resolve(fs, &root);
        log.debug(&format!("package manager: {}", profile.id));

        Ok(Self {
            root,
            settings,
            profile,
        })
    }

    /// Build a task context backed by the real system.
    #[must_use]
    pub fn into_context(
        self,
        global: &GlobalOpts,
        flags: MigrateFlags,
        log: Arc<dyn Log>,
    ) -> Context {
        Context {
            root: self.root,
            settings: self.settings,
            log,
            executor: Arc::new(SystemExecutor),
            fs_ops: Arc::new(SystemFileSystemOps),
            confirm: Arc::new(TerminalConfirm),
            opts: run_options(global),
            flags,
            profile: self.profile,
            today: chrono::Local::now().date_naive(),
        }
    }
}

/// The side-effect policy requested on the command line.
#[must_use]
pub const fn run_options(global: &GlobalOpts) -> RunOptions {
    RunOptions {
        dry_run: global.dry_run,
        silent: global.silent,
        force: global.force,
    }
}

/// Resolve the project root from `--root` or the current directory.
///
/// # Errors
///
/// Returns an error if the directory does not exist.
pub fn resolve_root(global: &GlobalOpts) -> Result<PathBuf> {
    let root = match &global.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("reading current directory")?,
    };
    if !root.is_dir() {
        return Err(MigrationError::NotFound { path: root }.into());
    }
    dunce::canonicalize(&root).with_context(|| format!("resolving {}", root.display()))
}
