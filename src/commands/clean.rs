//! Command: remove one tool's configuration.
use std::sync::Arc;

use anyhow::Result;

use super::CommandSetup;
use crate::cli::{CleanOpts, GlobalOpts};
use crate::config::ToolId;
use crate::logging::{Log, Logger};
use crate::migration::BackupOptions;
use crate::migration::backup::{create_backup, plan_backup, write_summary};
use crate::migration::cleanup::{ToolCleanup, remove_tool_configs};
use crate::migration::detect::detect;
use crate::operations::SystemFileSystemOps;
use crate::resources::helpers::fs::display_relative;
use crate::tasks::{Context, MigrateFlags};

/// Run the clean command.
///
/// # Errors
///
/// Returns an error if setup fails, the tool id is unknown, or a removal
/// fails without `--force`.
pub fn run(global: &GlobalOpts, opts: &CleanOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = CommandSetup::init(global, &SystemFileSystemOps, log.as_ref())?;
    let flags = MigrateFlags {
        yes: opts.yes,
        skip_backup: opts.skip_backup,
        ..MigrateFlags::default()
    };
    let ctx = setup.into_context(global, flags, Arc::clone(log) as Arc<dyn Log>);
    clean_tool(&ctx, &opts.tool)?;
    Ok(())
}

/// Remove the artifacts of the tool named `tool_id`, asking first unless
/// `--yes` or dry-run is in effect.
///
/// The tool's configuration is backed up to
/// `<backup-dir>/<prefix>-<tool>-<date>.md` before anything is removed,
/// unless `--skip-backup` was given. Returns `None` when the user declined.
///
/// # Errors
///
/// Returns [`MigrationError::Validation`](crate::error::MigrationError::Validation)
/// for an unknown tool id, a backup error (nothing is removed then), and any
/// removal error when `force` is not set.
pub fn clean_tool(ctx: &Context, tool_id: &str) -> Result<Option<ToolCleanup>> {
    let tool: ToolId = tool_id.parse()?;
    if !ctx.opts.dry_run && !ctx.flags.yes {
        let prompt = format!(
            "Remove {} configuration from {}?",
            tool.name(),
            ctx.root.display()
        );
        if !ctx.confirm.confirm(&prompt)? {
            ctx.log.warn("nothing removed");
            return Ok(None);
        }
    }

    ctx.log.stage(&format!("Removing {}", tool.name()));
    if ctx.flags.skip_backup {
        ctx.log.debug("backup skipped (--skip-backup)");
    } else {
        back_up_tool(ctx, tool)?;
    }
    let cleanup = remove_tool_configs(
        ctx.fs_ops.as_ref(),
        ctx.log.as_ref(),
        &ctx.root,
        tool.id(),
        ctx.opts,
    )?;

    if !ctx.opts.silent {
        let mut removed: Vec<String> = cleanup
            .paths
            .iter()
            .map(|p| display_relative(&ctx.root, p))
            .collect();
        removed.extend(cleanup.fields.iter().map(|f| format!("package.json#{f}")));
        if removed.is_empty() {
            ctx.log.info(&format!("no {} configuration found", tool.name()));
        } else if !ctx.opts.dry_run {
            ctx.log.info(&format!("removed {}", removed.join(", ")));
        }
    }
    Ok(Some(cleanup))
}

/// Snapshot what `tool` currently has in the project. A tool with nothing
/// left to remove needs no snapshot.
fn back_up_tool(ctx: &Context, tool: ToolId) -> Result<()> {
    let fs = ctx.fs_ops.as_ref();
    let inventory = detect(fs, &ctx.root)?.only(tool);
    if !inventory.has_configs {
        return Ok(());
    }
    let base = ctx.backup_options();
    let opts = BackupOptions {
        prefix: format!("{}-{}", base.prefix, tool.id()),
        ..base
    };

    if ctx.opts.dry_run {
        let record = plan_backup(&inventory, &opts, ctx.today)?;
        ctx.log.dry_run(&format!(
            "would back up {} file(s) to {}",
            record.configs.len(),
            display_relative(&ctx.root, &record.path)
        ));
        return Ok(());
    }

    let record = create_backup(fs, ctx.log.as_ref(), &ctx.root, &inventory, &opts, ctx.today)?;
    write_summary(fs, &ctx.root, &record, &opts, ctx.today)?;
    if !ctx.opts.silent {
        ctx.log.info(&format!(
            "backed up {} file(s) to {}",
            record.configs.len(),
            display_relative(&ctx.root, &record.path)
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::error::MigrationError;
    use crate::exec::MockExecutor;
    use crate::logging::RecordingLog;
    use crate::operations::{FileSystemOps, MockFileSystemOps};
    use crate::resources::RunOptions;
    use crate::tasks::context::MockConfirm;
    use crate::tasks::test_helpers::make_context;
    use std::path::{Path, PathBuf};

    fn project() -> Arc<MockFileSystemOps> {
        Arc::new(
            MockFileSystemOps::new()
                .with_file("/p/.stylelintrc.json", "{}")
                .with_file("/p/package.json", r#"{"stylelint":{"extends":[]}}"#),
        )
    }

    #[test]
    fn removes_files_and_manifest_key_with_yes() {
        let fs = project();
        let mut ctx = make_context(
            Arc::clone(&fs),
            MockExecutor::new(),
            Arc::new(RecordingLog::default()),
            RunOptions::default(),
        );
        ctx.flags.yes = true;

        let cleanup = clean_tool(&ctx, "stylelint").unwrap().unwrap();

        assert_eq!(cleanup.fields, vec!["stylelint"]);
        assert!(!fs.exists(Path::new("/p/.stylelintrc.json")));
    }

    #[test]
    fn backs_up_the_tool_before_removing() {
        let fs = project();
        let mut ctx = make_context(
            Arc::clone(&fs),
            MockExecutor::new(),
            Arc::new(RecordingLog::default()),
            RunOptions::default(),
        );
        ctx.flags.yes = true;

        clean_tool(&ctx, "stylelint").unwrap().unwrap();

        let backup = Path::new("/p/.configshift/backups/configshift-stylelint-2026-03-14.md");
        assert_eq!(fs.writes()[0], backup);
        let doc = fs.contents(backup).unwrap();
        assert!(doc.contains("### .stylelintrc.json"));
        assert!(doc.contains("### package.json (field `stylelint`)"));
        assert!(fs.exists(Path::new(
            "/p/.configshift/backups/configshift-stylelint-2026-03-14-summary.txt"
        )));
    }

    #[test]
    fn skip_backup_removes_without_snapshot() {
        let fs = project();
        let mut ctx = make_context(
            Arc::clone(&fs),
            MockExecutor::new(),
            Arc::new(RecordingLog::default()),
            RunOptions::default(),
        );
        ctx.flags.yes = true;
        ctx.flags.skip_backup = true;

        clean_tool(&ctx, "stylelint").unwrap().unwrap();

        assert_eq!(fs.writes(), vec![PathBuf::from("/p/package.json")]);
        assert!(!fs.exists(Path::new("/p/.stylelintrc.json")));
    }

    #[test]
    fn failed_backup_removes_nothing() {
        let fs = Arc::new(
            MockFileSystemOps::new()
                .with_file("/p/.stylelintrc.json", "{}")
                .failing_write("/p/.configshift/backups"),
        );
        let mut ctx = make_context(
            Arc::clone(&fs),
            MockExecutor::new(),
            Arc::new(RecordingLog::default()),
            RunOptions::default(),
        );
        ctx.flags.yes = true;

        let err = clean_tool(&ctx, "stylelint").unwrap_err();

        assert!(matches!(
            err.downcast_ref::<MigrationError>(),
            Some(MigrationError::Internal { .. })
        ));
        assert!(fs.remove_calls().is_empty());
        assert!(fs.exists(Path::new("/p/.stylelintrc.json")));
    }

    #[test]
    fn declined_prompt_removes_nothing() {
        let fs = project();
        let mut ctx = make_context(
            Arc::clone(&fs),
            MockExecutor::new(),
            Arc::new(RecordingLog::default()),
            RunOptions::default(),
        );
        let mut confirm = MockConfirm::new();
        confirm.expect_confirm().times(1).returning(|_| Ok(false));
        ctx.confirm = Arc::new(confirm);

        assert!(clean_tool(&ctx, "stylelint").unwrap().is_none());
        assert!(fs.remove_calls().is_empty());
    }

    #[test]
    fn unknown_tool_is_a_validation_error() {
        let ctx = make_context(
            project(),
            MockExecutor::new(),
            Arc::new(RecordingLog::default()),
            RunOptions::default(),
        );
        let err = clean_tool(&ctx, "jshint").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MigrationError>(),
            Some(MigrationError::Validation(_))
        ));
    }
}
