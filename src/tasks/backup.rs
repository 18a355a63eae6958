//! Task: write the configuration snapshot.
use anyhow::Result;

use super::{Context, PipelineState, Task, TaskResult};
use crate::migration::MigrationReport;
use crate::migration::backup::{create_backup, plan_backup, write_summary};
use crate::resources::helpers::fs::display_relative;

/// Snapshot every detected configuration before anything is removed.
#[derive(Debug)]
pub struct BackupConfigs;

impl Task for BackupConfigs {
    fn name(&self) -> &'static str {
        "Back up configuration"
    }

    fn id(&self) -> &'static str {
        "backup"
    }

    fn should_run(&self, _ctx: &Context, state: &PipelineState) -> bool {
        state.inventory.has_configs
    }

    fn run(
        &self,
        ctx: &Context,
        state: &mut PipelineState,
        report: &mut MigrationReport,
    ) -> Result<TaskResult> {
        if ctx.flags.skip_backup {
            return Ok(TaskResult::Skipped("backups disabled".to_string()));
        }
        let opts = ctx.backup_options();

        if ctx.opts.dry_run {
            let record = plan_backup(&state.inventory, &opts, ctx.today)?;
            ctx.log.dry_run(&format!(
                "would back up {} file(s) to {}",
                record.configs.len(),
                display_relative(&ctx.root, &record.path)
            ));
            state.backup = Some(record);
            return Ok(TaskResult::DryRun);
        }

        let fs = ctx.fs_ops.as_ref();
        let record = create_backup(
            fs,
            ctx.log.as_ref(),
            &ctx.root,
            &state.inventory,
            &opts,
            ctx.today,
        )?;
        let summary = write_summary(fs, &ctx.root, &record, &opts, ctx.today)?;
        ctx.log.debug(&format!("summary: {}", summary.display()));

        let shown = display_relative(&ctx.root, &record.path);
        if !ctx.opts.silent {
            ctx.log.info(&format!(
                "backed up {} file(s) to {shown}",
                record.configs.len()
            ));
        }
        report.set_backup(record.path.clone());
        state.backup = Some(record);
        Ok(TaskResult::Completed(shown))
    }
}
