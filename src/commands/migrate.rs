//! Command: run the full migration pipeline.
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;

use super::CommandSetup;
use crate::cli::{GlobalOpts, MigrateOpts};
use crate::error::MigrationError;
use crate::logging::{Log, Logger};
use crate::migration::{MigrationReport, StepStatus};
use crate::operations::SystemFileSystemOps;
use crate::resources::helpers::fs::display_relative;
use crate::tasks::{self, Context, MigrateFlags, PipelineState};

/// Run the migrate command.
///
/// # Errors
///
/// Returns an error if setup fails, an unknown task id is skipped, or any
/// step of the pipeline ends in an error.
pub fn run(global: &GlobalOpts, opts: &MigrateOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = CommandSetup::init(global, &SystemFileSystemOps, log.as_ref())?;
    log.info(&format!(
        "configshift {} in {} ({})",
        super::version(),
        setup.root.display(),
        setup.profile.id
    ));

    let flags = MigrateFlags {
        yes: opts.yes,
        skip_backup: opts.skip_backup,
        overwrite_scripts: opts.overwrite_scripts,
        keep: opts.keep.clone(),
    };
    let ctx = setup.into_context(global, flags, Arc::clone(log) as Arc<dyn Log>);
    let report = run_pipeline(&ctx, &opts.skip)?;

    log.debug(&format!("log file: {}", log.log_path().display()));
    if !report.is_successful() {
        anyhow::bail!("{} step(s) failed", report.summary().errors);
    }
    Ok(())
}

/// Execute every migrate task against `ctx`, write the report and print the
/// summary.
///
/// Without `force` the first failed step stops the pipeline; the remaining
/// tasks are recorded as skipped.
///
/// # Errors
///
/// Returns [`MigrationError::Validation`] for an unknown id in `skip`, and
/// an error if the report file cannot be written.
pub fn run_pipeline(ctx: &Context, skip: &[String]) -> Result<MigrationReport> {
    let all_tasks = tasks::all_migrate_tasks();
    if let Some(unknown) = skip
        .iter()
        .find(|s| !all_tasks.iter().any(|t| t.id() == s.as_str()))
    {
        let ids: Vec<&str> = all_tasks.iter().map(|t| t.id()).collect();
        return Err(MigrationError::validation(format!(
            "unknown task '{unknown}' (expected one of: {})",
            ids.join(", ")
        ))
        .into());
    }

    let mut report = MigrationReport::new(Utc::now());
    report.set_profile(ctx.profile);
    let mut state = PipelineState::default();
    let mut aborted = false;

    for task in &all_tasks {
        if skip.iter().any(|s| s == task.id()) {
            report.add_step(
                task.name(),
                StepStatus::Skipped,
                Some("skipped by --skip".to_string()),
                Duration::ZERO,
            );
            continue;
        }
        if aborted {
            report.add_step(
                task.name(),
                StepStatus::Skipped,
                Some("not run after an earlier error".to_string()),
                Duration::ZERO,
            );
            continue;
        }
        let status = tasks::execute(task.as_ref(), ctx, &mut state, &mut report);
        if status == StepStatus::Error && !ctx.opts.force {
            aborted = true;
        }
    }

    if ctx.opts.dry_run {
        ctx.log.dry_run("would write the migration report");
    } else {
        let path = report.write_report(
            ctx.fs_ops.as_ref(),
            &ctx.root,
            &ctx.settings.prefix,
            ctx.today,
        )?;
        if !ctx.opts.silent {
            ctx.log
                .info(&format!("report: {}", display_relative(&ctx.root, &path)));
        }
    }
    report.print_summary(ctx.log.as_ref());
    Ok(report)
}
