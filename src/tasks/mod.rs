//! Named pipeline tasks that drive the migration engine.
//!
//! Each task reads the shared [`Context`], hands results to later tasks
//! through [`PipelineState`], and is recorded as one step of the
//! [`MigrationReport`] by [`execute`].
pub mod backup;
pub mod cleanup;
pub mod context;
pub mod detect;
pub mod install;
pub mod merge;

pub use context::{
    Confirm, Context, MigrateFlags, PipelineState, TerminalConfirm,
};

use std::time::Instant;

use anyhow::Result;

use crate::error::MigrationError;
use crate::migration::{MigrationReport, StepStatus};

/// Result of a single task execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskResult {
    /// Task completed; nothing worth reporting.
    Ok,
    /// Task completed with a one-line account of what changed.
    Completed(String),
    /// Task completed but something needs the user's attention.
    Warning(String),
    /// Task did not apply to this project or run.
    Skipped(String),
    /// Task ran in dry-run mode.
    DryRun,
}

/// A named, executable pipeline step.
pub trait Task: Send + Sync {
    /// Human-readable task name, used as the step action.
    fn name(&self) -> &'static str;

    /// Short id accepted by `--skip`.
    fn id(&self) -> &'static str;

    /// Whether this task applies to the project and run so far.
    fn should_run(&self, _ctx: &Context, _state: &PipelineState) -> bool {
        true
    }

    /// Execute the task.
    ///
    /// # Errors
    ///
    /// Returns an error if the task fails; the step is recorded as an error.
    fn run(
        &self,
        ctx: &Context,
        state: &mut PipelineState,
        report: &mut MigrationReport,
    ) -> Result<TaskResult>;
}

/// The full `migrate` pipeline, in execution order.
#[must_use]
pub fn all_migrate_tasks() -> Vec<Box<dyn Task>> {
    vec![
        Box::new(detect::DetectConfigs),
        Box::new(backup::BackupConfigs),
        Box::new(cleanup::ConfirmCleanup),
        Box::new(cleanup::RemoveOldConfigs),
        Box::new(cleanup::RemoveGitHooks),
        Box::new(cleanup::RemoveOldDependencies),
        Box::new(install::InstallTools),
        Box::new(merge::MergeScripts),
        Box::new(merge::MergeEditorSettings),
    ]
}

/// Describe an error for the report, prefixed with its kind when it is a
/// [`MigrationError`].
fn describe_error(e: &anyhow::Error) -> String {
    match e.downcast_ref::<MigrationError>() {
        Some(m) => format!("{}: {e:#}", m.kind()),
        None => format!("{e:#}"),
    }
}

/// Execute a task, recording the result as a step in `report`.
pub fn execute(
    task: &dyn Task,
    ctx: &Context,
    state: &mut PipelineState,
    report: &mut MigrationReport,
) -> StepStatus {
    let started = Instant::now();
    if !task.should_run(ctx, state) {
        ctx.log
            .debug(&format!("skipping task: {} (not applicable)", task.name()));
        report.add_step(
            task.name(),
            StepStatus::Skipped,
            Some("not applicable".to_string()),
            started.elapsed(),
        );
        return StepStatus::Skipped;
    }

    if !ctx.opts.silent {
        ctx.log.stage(task.name());
    }

    let (status, details) = match task.run(ctx, state, report) {
        Ok(TaskResult::Ok) => (StepStatus::Success, None),
        Ok(TaskResult::Completed(details)) => (StepStatus::Success, Some(details)),
        Ok(TaskResult::Warning(reason)) => {
            ctx.log.warn(&reason);
            (StepStatus::Warning, Some(reason))
        }
        Ok(TaskResult::Skipped(reason)) => {
            if !ctx.opts.silent {
                ctx.log.info(&format!("skipped: {reason}"));
            }
            (StepStatus::Skipped, Some(reason))
        }
        Ok(TaskResult::DryRun) => (StepStatus::Success, Some("dry run".to_string())),
        Err(e) => {
            let details = describe_error(&e);
            ctx.log.error(&format!("{}: {details}", task.name()));
            (StepStatus::Error, Some(details))
        }
    };
    report.add_step(task.name(), status, details, started.elapsed());
    status
}
