//! Tasks that remove superseded configuration, hooks and packages once the
//! backup exists and the user agreed.
use anyhow::Result;

use super::{Context, PipelineState, Task, TaskResult};
use crate::config::PackageManifest;
use crate::migration::MigrationReport;
use crate::migration::cleanup::{
    remove_embedded_configs, remove_git_hooks, remove_old_configs, remove_old_dependencies,
    superseded_dependencies,
};
use crate::resources::BatchOutcome;
use crate::resources::helpers::fs::display_relative;

fn blocked(ctx: &Context, state: &PipelineState) -> Option<TaskResult> {
    state
        .cleanup_blocked(ctx)
        .map(|reason| TaskResult::Skipped(reason.to_string()))
}

fn superseded(ctx: &Context) -> Result<Vec<String>> {
    Ok(PackageManifest::load(ctx.fs_ops.as_ref(), &ctx.root)?
        .map(|m| superseded_dependencies(&m, &ctx.keep_list()))
        .unwrap_or_default())
}

/// Gate every destructive task behind an explicit yes.
#[derive(Debug)]
pub struct ConfirmCleanup;

impl Task for ConfirmCleanup {
    fn name(&self) -> &'static str {
        "Confirm cleanup"
    }

    fn id(&self) -> &'static str {
        "confirm"
    }

    fn run(
        &self,
        ctx: &Context,
        state: &mut PipelineState,
        _report: &mut MigrationReport,
    ) -> Result<TaskResult> {
        let packages = superseded(ctx)?;
        if !state.inventory.has_configs && packages.is_empty() {
            state.confirmed = true;
            return Ok(TaskResult::Skipped("nothing to remove".to_string()));
        }
        if ctx.opts.dry_run || ctx.flags.yes {
            state.confirmed = true;
            return Ok(TaskResult::Ok);
        }
        let prompt = format!(
            "Remove {} configuration entr{} and {} package(s)?",
            state.inventory.configs.len(),
            if state.inventory.configs.len() == 1 {
                "y"
            } else {
                "ies"
            },
            packages.len()
        );
        state.confirmed = ctx.confirm.confirm(&prompt)?;
        if state.confirmed {
            Ok(TaskResult::Ok)
        } else {
            Ok(TaskResult::Warning(
                "cleanup declined; old configuration left in place".to_string(),
            ))
        }
    }
}

/// Remove standalone configuration files and manifest-embedded keys.
///
/// Directory-owning tools are left to [`RemoveGitHooks`].
#[derive(Debug)]
pub struct RemoveOldConfigs;

impl Task for RemoveOldConfigs {
    fn name(&self) -> &'static str {
        "Remove old configuration"
    }

    fn id(&self) -> &'static str {
        "configs"
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
        if let Some(skip) = blocked(ctx, state) {
            return Ok(skip);
        }
        let fs = ctx.fs_ops.as_ref();
        let paths = state.inventory.standalone_paths();

        let removed = remove_old_configs(fs, ctx.log.as_ref(), &ctx.root, &paths, ctx.opts)?;
        let fields = remove_embedded_configs(
            fs,
            ctx.log.as_ref(),
            &ctx.root,
            &state.inventory.embedded_fields(),
            ctx.opts,
        )?;

        for path in &removed {
            report.add_removed_config(display_relative(&ctx.root, path));
        }
        for field in &fields {
            report.add_removed_config(format!("package.json#{field}"));
        }

        if ctx.opts.dry_run {
            return Ok(TaskResult::DryRun);
        }
        let expected = paths.len() + state.inventory.embedded_fields().len();
        let done = removed.len() + fields.len();
        let summary = format!("removed {} file(s) and {} field(s)", removed.len(), fields.len());
        if done < expected {
            Ok(TaskResult::Warning(format!(
                "{summary}; {} could not be removed",
                expected - done
            )))
        } else {
            Ok(TaskResult::Completed(summary))
        }
    }
}

/// Remove the active git-hook manager's on-disk footprint.
#[derive(Debug)]
pub struct RemoveGitHooks;

impl Task for RemoveGitHooks {
    fn name(&self) -> &'static str {
        "Remove git hook manager"
    }

    fn id(&self) -> &'static str {
        "hooks"
    }

    fn should_run(&self, _ctx: &Context, state: &PipelineState) -> bool {
        state.probes.hook_manager.is_some()
    }

    fn run(
        &self,
        ctx: &Context,
        state: &mut PipelineState,
        report: &mut MigrationReport,
    ) -> Result<TaskResult> {
        if let Some(skip) = blocked(ctx, state) {
            return Ok(skip);
        }
        let Some(manager) = state.probes.hook_manager else {
            return Ok(TaskResult::Skipped("no git hook manager".to_string()));
        };
        let removed = remove_git_hooks(
            ctx.fs_ops.as_ref(),
            ctx.log.as_ref(),
            &ctx.root,
            manager,
            ctx.opts,
        )?;
        for path in &removed {
            report.add_removed_config(display_relative(&ctx.root, path));
        }
        if ctx.opts.dry_run {
            return Ok(TaskResult::DryRun);
        }
        Ok(TaskResult::Completed(format!("{manager} removed")))
    }
}

/// Remove superseded packages in one batch.
#[derive(Debug)]
pub struct RemoveOldDependencies;

impl Task for RemoveOldDependencies {
    fn name(&self) -> &'static str {
        "Remove old dependencies"
    }

    fn id(&self) -> &'static str {
        "dependencies"
    }

    fn should_run(&self, ctx: &Context, _state: &PipelineState) -> bool {
        ctx.fs_ops.is_file(&ctx.root.join(crate::config::MANIFEST_FILE))
    }

    fn run(
        &self,
        ctx: &Context,
        state: &mut PipelineState,
        report: &mut MigrationReport,
    ) -> Result<TaskResult> {
        if let Some(skip) = blocked(ctx, state) {
            return Ok(skip);
        }
        let manifest = PackageManifest::require(ctx.fs_ops.as_ref(), &ctx.root)?;
        let removal =
            remove_old_dependencies(&ctx.installer(), &manifest, &ctx.keep_list(), ctx.opts)?;

        match removal.outcome {
            BatchOutcome::Skipped => Ok(TaskResult::Completed(
                "no superseded packages".to_string(),
            )),
            BatchOutcome::DryRun => Ok(TaskResult::DryRun),
            BatchOutcome::Failed { reason } => Ok(TaskResult::Warning(format!(
                "could not remove {}: {reason}",
                removal.packages.join(", ")
            ))),
            BatchOutcome::Completed => {
                for package in &removal.packages {
                    report.add_removed_tool(package.clone());
                }
                Ok(TaskResult::Completed(removal.packages.join(", ")))
            }
        }
    }
}
