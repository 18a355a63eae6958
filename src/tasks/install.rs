//! Task: install the replacement toolchain.
use anyhow::Result;

use super::{Context, PipelineState, Task, TaskResult};
use crate::config::MANIFEST_FILE;
use crate::migration::MigrationReport;
use crate::resources::BatchOutcome;

/// Add the replacement toolchain and run its init commands.
#[derive(Debug)]
pub struct InstallTools;

impl Task for InstallTools {
    fn name(&self) -> &'static str {
        "Install new tooling"
    }

    fn id(&self) -> &'static str {
        "install"
    }

    fn should_run(&self, ctx: &Context, _state: &PipelineState) -> bool {
        ctx.fs_ops.is_file(&ctx.root.join(MANIFEST_FILE))
    }

    fn run(
        &self,
        ctx: &Context,
        _state: &mut PipelineState,
        report: &mut MigrationReport,
    ) -> Result<TaskResult> {
        let installer = ctx.installer();
        let install = &ctx.settings.install;
        let mut failures = Vec::new();

        // A fresh checkout needs its existing dependencies before init runs.
        if !install.init.is_empty()
            && !ctx.fs_ops.is_dir(&ctx.root.join("node_modules"))
            && let BatchOutcome::Failed { reason } = installer.install(false, ctx.opts)?
        {
            failures.push(format!("install: {reason}"));
        }

        match installer.add(&install.packages, true, ctx.opts)? {
            BatchOutcome::Completed => {
                for package in &install.packages {
                    report.add_installed_tool(package.clone());
                }
            }
            BatchOutcome::Failed { reason } => {
                failures.push(format!("add {}: {reason}", install.packages.join(" ")));
            }
            BatchOutcome::DryRun | BatchOutcome::Skipped => {}
        }

        for argv in &install.init {
            if let BatchOutcome::Failed { reason } = installer.dlx(argv, ctx.opts)? {
                failures.push(format!("{}: {reason}", argv.join(" ")));
            }
        }

        if !failures.is_empty() {
            return Ok(TaskResult::Warning(failures.join("; ")));
        }
        if ctx.opts.dry_run {
            return Ok(TaskResult::DryRun);
        }
        if install.packages.is_empty() {
            return Ok(TaskResult::Skipped("no packages configured".to_string()));
        }
        Ok(TaskResult::Completed(format!(
            "{} via {}",
            install.packages.join(", "),
            installer.profile().id
        )))
    }
}
