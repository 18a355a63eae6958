//! The migration engine: detection, backup, cleanup, merging and reporting.
pub mod backup;
pub mod cleanup;
pub mod detect;
pub mod merge;
pub mod report;

pub use backup::{BackupOptions, BackupRecord};
pub use detect::{DetectedConfig, ProjectProbes, ToolInventory};
pub use merge::{ArrayPolicy, MergeOptions, MergeStrategy, deep_merge};
pub use report::{MigrationReport, MigrationStep, MigrationSummary, StepStatus};
