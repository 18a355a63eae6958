//! Tasks that merge scripts and editor settings into existing files.
use anyhow::Result;

use super::{Context, PipelineState, Task, TaskResult};
use crate::config::MANIFEST_FILE;
use crate::migration::MigrationReport;
use crate::migration::merge::{merge_extension_recommendations, merge_scripts, merge_settings_file};
use crate::resources::helpers::fs::display_relative;

/// Merge the configured script map into `package.json`.
#[derive(Debug)]
pub struct MergeScripts;

impl Task for MergeScripts {
    fn name(&self) -> &'static str {
        "Merge package scripts"
    }

    fn id(&self) -> &'static str {
        "scripts"
    }

    fn should_run(&self, ctx: &Context, _state: &PipelineState) -> bool {
        !ctx.settings.scripts.is_empty() && ctx.fs_ops.is_file(&ctx.root.join(MANIFEST_FILE))
    }

    fn run(
        &self,
        ctx: &Context,
        _state: &mut PipelineState,
        _report: &mut MigrationReport,
    ) -> Result<TaskResult> {
        let outcome = merge_scripts(
            ctx.fs_ops.as_ref(),
            &ctx.root.join(MANIFEST_FILE),
            &ctx.settings.scripts_json()?,
            ctx.flags.overwrite_scripts,
            ctx.opts.dry_run,
        )?;

        if ctx.opts.dry_run {
            for name in outcome.added.iter().chain(&outcome.replaced) {
                ctx.log.dry_run(&format!("would set script \"{name}\""));
            }
        }
        if !outcome.kept.is_empty() {
            return Ok(TaskResult::Warning(format!(
                "kept existing script(s): {}; pass --overwrite-scripts to replace",
                outcome.kept.join(", ")
            )));
        }
        if ctx.opts.dry_run {
            return Ok(TaskResult::DryRun);
        }
        if !outcome.changed() {
            return Ok(TaskResult::Completed("scripts already up to date".to_string()));
        }
        let mut changed = outcome.added;
        changed.extend(outcome.replaced);
        Ok(TaskResult::Completed(changed.join(", ")))
    }
}

/// Point the editor at the new tooling.
#[derive(Debug)]
pub struct MergeEditorSettings;

impl Task for MergeEditorSettings {
    fn name(&self) -> &'static str {
        "Merge editor settings"
    }

    fn id(&self) -> &'static str {
        "editor"
    }

    fn should_run(&self, ctx: &Context, _state: &PipelineState) -> bool {
        ctx.fs_ops.is_dir(&ctx.root.join(".vscode"))
    }

    fn run(
        &self,
        ctx: &Context,
        _state: &mut PipelineState,
        report: &mut MigrationReport,
    ) -> Result<TaskResult> {
        let fs = ctx.fs_ops.as_ref();
        let editor = &ctx.settings.editor;
        let settings_path = ctx.root.join(".vscode/settings.json");
        let extensions_path = ctx.root.join(".vscode/extensions.json");
        let settings_existed = fs.is_file(&settings_path);
        let extensions_existed = fs.is_file(&extensions_path);

        let mut touched = Vec::new();
        if merge_settings_file(
            fs,
            &settings_path,
            &ctx.settings.editor_settings_json()?,
            ctx.opts.dry_run,
        )? {
            touched.push((settings_path, settings_existed));
        }
        if (!editor.recommendations.is_empty() || !editor.unwanted.is_empty())
            && merge_extension_recommendations(
                fs,
                &extensions_path,
                &editor.recommendations,
                &editor.unwanted,
                ctx.opts.dry_run,
            )?
        {
            touched.push((extensions_path, extensions_existed));
        }

        let mut shown = Vec::new();
        for (path, existed) in &touched {
            let rel = display_relative(&ctx.root, path);
            if ctx.opts.dry_run {
                ctx.log.dry_run(&format!("would update {rel}"));
            } else if !existed {
                report.add_created_config(rel.clone());
            }
            shown.push(rel);
        }

        if ctx.opts.dry_run {
            return Ok(TaskResult::DryRun);
        }
        if shown.is_empty() {
            return Ok(TaskResult::Completed(
                "editor settings already up to date".to_string(),
            ));
        }
        Ok(TaskResult::Completed(shown.join(", ")))
    }
}
