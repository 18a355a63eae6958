//! Task: inventory the project before anything changes.
use anyhow::Result;

use super::{Context, PipelineState, Task, TaskResult};
use crate::migration::detect::detect;
use crate::migration::{MigrationReport, ProjectProbes};
use crate::resources::helpers::fs::display_relative;

/// Inventory existing configuration and probe the project.
#[derive(Debug)]
pub struct DetectConfigs;

impl Task for DetectConfigs {
    fn name(&self) -> &'static str {
        "Detect existing configuration"
    }

    fn id(&self) -> &'static str {
        "detect"
    }

    fn run(
        &self,
        ctx: &Context,
        state: &mut PipelineState,
        _report: &mut MigrationReport,
    ) -> Result<TaskResult> {
        let fs = ctx.fs_ops.as_ref();
        state.inventory = detect(fs, &ctx.root)?;
        state.probes = ProjectProbes::collect(fs, &ctx.root)?;

        for config in &state.inventory.configs {
            let location = display_relative(&ctx.root, &config.path);
            match &config.field {
                Some(field) => ctx
                    .log
                    .debug(&format!("{}: {location} ({field})", config.tool)),
                None => ctx.log.debug(&format!("{}: {location}", config.tool)),
            }
        }
        if let Some(manager) = state.probes.hook_manager {
            ctx.log.debug(&format!("git hooks managed by {manager}"));
        }

        if !state.inventory.has_configs {
            return Ok(TaskResult::Completed(
                "no existing configuration found".to_string(),
            ));
        }
        let tools: Vec<&str> = state.inventory.tools.iter().map(|t| t.id()).collect();
        let summary = format!(
            "{} file(s) from {}",
            state.inventory.configs.len(),
            tools.join(", ")
        );
        if !ctx.opts.silent {
            ctx.log.info(&summary);
        }
        Ok(TaskResult::Completed(summary))
    }
}
