//! Primitives the migration stages are built from: package-manager profiles,
//! the batched installer, repository git config, and filesystem/JSON helpers.
pub mod git_config;
pub mod helpers;
pub mod installer;
pub mod package_manager;

pub use installer::{BatchOutcome, Installer};
pub use package_manager::{PackageManager, PackageManagerProfile};

/// Side-effect policy shared by every mutating operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Describe what would change; touch nothing.
    pub dry_run: bool,
    /// Suppress informational output (warnings and errors still show).
    pub silent: bool,
    /// Downgrade individual failures to warnings and keep going.
    pub force: bool,
}
