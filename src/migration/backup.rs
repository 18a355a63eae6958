//! Human-readable snapshot of the inventory, written before anything is
//! removed.
//!
//! The snapshot is one Markdown document per calendar day,
//! `<backup-dir>/<prefix>-<YYYY-MM-DD>.md`, with a plain-text companion
//! summary. A rerun on the same day overwrites both.
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use sha2::{Digest, Sha256};

use super::detect::{DetectedConfig, ToolInventory};
use crate::config::ToolId;
use crate::error::{MigrationError, Result};
use crate::logging::Log;
use crate::operations::FileSystemOps;
use crate::resources::helpers::fs::{display_relative, write_file};

/// Where and how to write the snapshot.
#[derive(Debug, Clone)]
pub struct BackupOptions {
    /// Absolute backup directory.
    pub dir: PathBuf,
    /// File-name prefix of the snapshot.
    pub prefix: String,
    /// Append the restoration-instructions section.
    pub include_instructions: bool,
}

/// A snapshot that has been (or, in a dry run, would be) written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRecord {
    /// Snapshot file.
    pub path: PathBuf,
    /// Configuration captured in it.
    pub configs: Vec<DetectedConfig>,
}

impl BackupOptions {
    /// Path of the snapshot for `date`.
    #[must_use]
    pub fn backup_path(&self, date: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("{}-{}.md", self.prefix, date.format("%Y-%m-%d")))
    }

    /// Path of the companion summary for `date`.
    #[must_use]
    pub fn summary_path(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!(
            "{}-{}-summary.txt",
            self.prefix,
            date.format("%Y-%m-%d")
        ))
    }
}

/// Build the record a backup of `inventory` would produce, without writing.
///
/// # Errors
///
/// Returns [`MigrationError::Validation`] if the inventory is empty.
pub fn plan_backup(
    inventory: &ToolInventory,
    opts: &BackupOptions,
    date: NaiveDate,
) -> Result<BackupRecord> {
    if inventory.configs.is_empty() {
        return Err(MigrationError::validation("no configurations to backup"));
    }
    Ok(BackupRecord {
        path: opts.backup_path(date),
        configs: inventory.configs.clone(),
    })
}

/// Render and write the snapshot of `inventory`.
///
/// # Errors
///
/// Returns [`MigrationError::Validation`] if the inventory is empty (nothing
/// is written), and [`MigrationError::Internal`] if the directory or file
/// cannot be written.
pub fn create_backup(
    fs: &dyn FileSystemOps,
    log: &dyn Log,
    root: &Path,
    inventory: &ToolInventory,
    opts: &BackupOptions,
    date: NaiveDate,
) -> Result<BackupRecord> {
    let record = plan_backup(inventory, opts, date)?;
    if fs.exists(&record.path) {
        log.warn(&format!(
            "overwriting today's backup {}",
            display_relative(root, &record.path)
        ));
    }
    let document = render_backup(root, &record.configs, opts.include_instructions, date);
    write_file(fs, &record.path, &document)?;
    log.debug(&format!(
        "wrote {} ({} bytes)",
        record.path.display(),
        document.len()
    ));
    Ok(record)
}

/// Write the one-line-per-file summary that points back at `record`.
///
/// # Errors
///
/// Returns [`MigrationError::Internal`] if the file cannot be written.
pub fn write_summary(
    fs: &dyn FileSystemOps,
    root: &Path,
    record: &BackupRecord,
    opts: &BackupOptions,
    date: NaiveDate,
) -> Result<PathBuf> {
    let path = opts.summary_path(date);
    write_file(fs, &path, &render_summary(root, record, date))?;
    Ok(path)
}

/// Entries grouped by tool, in first-appearance order.
fn group_by_tool(configs: &[DetectedConfig]) -> Vec<(ToolId, Vec<&DetectedConfig>)> {
    let mut groups: Vec<(ToolId, Vec<&DetectedConfig>)> = Vec::new();
    for config in configs {
        match groups.iter_mut().find(|(tool, _)| *tool == config.tool) {
            Some((_, entries)) => entries.push(config),
            None => groups.push((config.tool, vec![config])),
        }
    }
    groups
}

fn entry_label(root: &Path, config: &DetectedConfig) -> String {
    let path = display_relative(root, &config.path);
    match &config.field {
        Some(field) => format!("{path} (field `{field}`)"),
        None => path,
    }
}

fn sha256_hex(content: &str) -> String {
    format!("{:x}", Sha256::digest(content.as_bytes()))
}

/// A backtick fence longer than any backtick run inside `content`.
fn fence_for(content: &str) -> String {
    let longest = content
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    "`".repeat(longest.max(2) + 1)
}

fn fence_language(config: &DetectedConfig) -> &'static str {
    if config.is_embedded() {
        return "json";
    }
    if config.tool == ToolId::Husky {
        return "sh";
    }
    let ext = config
        .path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    match ext {
        "json" => "json",
        "jsonc" | "json5" => "jsonc",
        "yaml" | "yml" => "yaml",
        "toml" => "toml",
        "js" | "cjs" | "mjs" => "javascript",
        "ts" => "typescript",
        _ => "",
    }
}

/// Render the Markdown snapshot.
#[must_use]
pub fn render_backup(
    root: &Path,
    configs: &[DetectedConfig],
    include_instructions: bool,
    date: NaiveDate,
) -> String {
    let groups = group_by_tool(configs);
    let mut out = String::new();
    let _ = writeln!(out, "# Configuration backup ({})", date.format("%Y-%m-%d"));
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{} file(s) across {} tool(s), captured before migration.",
        configs.len(),
        groups.len()
    );

    for (tool, entries) in &groups {
        let _ = writeln!(out);
        let _ = writeln!(out, "## {}", tool.name());
        for config in entries {
            let fence = fence_for(&config.content);
            let _ = writeln!(out);
            let _ = writeln!(out, "### {}", entry_label(root, config));
            let _ = writeln!(out);
            let _ = writeln!(out, "SHA-256: `{}`", sha256_hex(&config.content));
            let _ = writeln!(out);
            let _ = writeln!(out, "{fence}{}", fence_language(config));
            out.push_str(&config.content);
            if !config.content.ends_with('\n') {
                out.push('\n');
            }
            let _ = writeln!(out, "{fence}");
        }
    }

    if include_instructions {
        out.push_str(RESTORE_INSTRUCTIONS);
    }
    out
}

const RESTORE_INSTRUCTIONS: &str = "
## Restoring

### Restore individual files

1. Recreate each file under the heading that names it, with the exact
   content of its fenced block.
2. Entries marked `(field ...)` belong in `package.json`: put the block back
   under that top-level key.
3. Compare `sha256sum <file>` against the recorded SHA-256.

### Remove the migration entirely

1. Delete the configuration files the migration created (listed in the
   migration report).
2. Restore every file in this backup as described above.
3. Restore `package.json` dependencies and scripts from version control, then
   reinstall with your package manager.
";

fn render_summary(root: &Path, record: &BackupRecord, date: NaiveDate) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Configuration backup {}: {} file(s)",
        date.format("%Y-%m-%d"),
        record.configs.len()
    );
    for config in &record.configs {
        let _ = writeln!(
            out,
            "{}\t{}\t{} bytes",
            config.tool,
            entry_label(root, config),
            config.content.len()
        );
    }
    let _ = writeln!(out, "Full backup: {}", display_relative(root, &record.path));
    out
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::RecordingLog;
    use crate::operations::MockFileSystemOps;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    fn opts() -> BackupOptions {
        BackupOptions {
            dir: PathBuf::from("/p/.configshift/backups"),
            prefix: "configshift".to_string(),
            include_instructions: true,
        }
    }

    fn config(tool: ToolId, path: &str, content: &str, field: Option<&str>) -> DetectedConfig {
        DetectedConfig {
            tool,
            path: PathBuf::from(path),
            content: content.to_string(),
            field: field.map(ToString::to_string),
        }
    }

    fn inventory(configs: Vec<DetectedConfig>) -> ToolInventory {
        ToolInventory {
            has_configs: !configs.is_empty(),
            tools: configs.iter().map(|c| c.tool).collect(),
            configs,
        }
    }

    #[test]
    fn empty_inventory_fails_without_writing() {
        let fs = MockFileSystemOps::new();
        let log = RecordingLog::default();
        let err = create_backup(
            &fs,
            &log,
            Path::new("/p"),
            &ToolInventory::default(),
            &opts(),
            date(),
        )
        .unwrap_err();

        assert!(matches!(err, MigrationError::Validation(_)));
        assert!(err.to_string().contains("no configurations to backup"));
        assert!(fs.writes().is_empty());
    }

    #[test]
    fn writes_dated_snapshot_grouped_by_tool() {
        let fs = MockFileSystemOps::new();
        let log = RecordingLog::default();
        let inv = inventory(vec![
            config(ToolId::Prettier, "/p/.prettierrc", "{\"semi\":false}\n", None),
            config(ToolId::Prettier, "/p/package.json", "{}\n", Some("prettier")),
            config(ToolId::Eslint, "/p/eslint.config.mjs", "export default [];\n", None),
        ]);

        let record = create_backup(&fs, &log, Path::new("/p"), &inv, &opts(), date()).unwrap();

        assert_eq!(
            record.path,
            PathBuf::from("/p/.configshift/backups/configshift-2026-03-14.md")
        );
        assert_eq!(record.configs.len(), 3);
        let doc = fs.contents(&record.path).unwrap();
        assert_eq!(doc.matches("\n## Prettier\n").count(), 1);
        assert!(doc.contains("### package.json (field `prettier`)"));
        assert!(doc.contains("```javascript\nexport default [];\n```"));
        assert!(doc.contains("## Restoring"));
        assert!(log.messages("warn").is_empty());
    }

    #[test]
    fn same_day_rerun_overwrites_with_warning() {
        let fs = MockFileSystemOps::new()
            .with_file("/p/.configshift/backups/configshift-2026-03-14.md", "old");
        let log = RecordingLog::default();
        let inv = inventory(vec![config(ToolId::Lefthook, "/p/lefthook.yml", "pre-commit:\n", None)]);

        create_backup(&fs, &log, Path::new("/p"), &inv, &opts(), date()).unwrap();

        assert_eq!(log.messages("warn").len(), 1);
        let doc = fs
            .contents(Path::new("/p/.configshift/backups/configshift-2026-03-14.md"))
            .unwrap();
        assert!(doc.contains("## Lefthook"));
    }

    #[test]
    fn unwritable_backup_directory_is_internal_error() {
        let fs = MockFileSystemOps::new().failing_write("/p/.configshift/backups");
        let log = RecordingLog::default();
        let inv = inventory(vec![config(ToolId::Prettier, "/p/.prettierrc", "{}", None)]);

        let err = create_backup(&fs, &log, Path::new("/p"), &inv, &opts(), date()).unwrap_err();

        assert!(matches!(err, MigrationError::Internal { .. }), "got {err:?}");
        assert_eq!(err.kind(), "InternalError");
        assert!(fs.writes().is_empty());
    }

    #[test]
    fn unwritable_backup_file_is_internal_error() {
        let fs = MockFileSystemOps::new()
            .failing_write("/p/.configshift/backups/configshift-2026-03-14.md");
        let log = RecordingLog::default();
        let inv = inventory(vec![config(ToolId::Prettier, "/p/.prettierrc", "{}", None)]);

        let err = create_backup(&fs, &log, Path::new("/p"), &inv, &opts(), date()).unwrap_err();

        assert!(matches!(err, MigrationError::Internal { .. }), "got {err:?}");
        assert!(err.to_string().contains("configshift-2026-03-14.md"));
    }

    #[test]
    fn instructions_can_be_disabled() {
        let configs = vec![config(ToolId::Prettier, "/p/.prettierrc", "{}", None)];
        let doc = render_backup(Path::new("/p"), &configs, false, date());
        assert!(!doc.contains("## Restoring"));
        assert!(doc.ends_with("```\n"));
    }

    #[test]
    fn fence_outgrows_embedded_backticks() {
        let content = "Use ```js blocks``` in docs\n";
        let configs = vec![config(ToolId::Markdownlint, "/p/.markdownlintrc", content, None)];
        let doc = render_backup(Path::new("/p"), &configs, false, date());
        assert!(doc.contains("````\nUse ```js blocks``` in docs\n````\n"), "got:\n{doc}");
    }

    #[test]
    fn records_content_checksum() {
        let configs = vec![config(ToolId::Prettier, "/p/.prettierrc", "", None)];
        let doc = render_backup(Path::new("/p"), &configs, false, date());
        assert!(doc.contains(
            "SHA-256: `e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855`"
        ));
    }

    #[test]
    fn summary_lists_each_file_and_points_at_backup() {
        let fs = MockFileSystemOps::new();
        let record = BackupRecord {
            path: opts().backup_path(date()),
            configs: vec![
                config(ToolId::Prettier, "/p/.prettierrc", "{}\n", None),
                config(ToolId::LintStaged, "/p/package.json", "{}\n", Some("lint-staged")),
            ],
        };

        let path = write_summary(&fs, Path::new("/p"), &record, &opts(), date()).unwrap();

        assert_eq!(
            path,
            PathBuf::from("/p/.configshift/backups/configshift-2026-03-14-summary.txt")
        );
        insta::assert_snapshot!(fs.contents(&path).unwrap(), @r"
        Configuration backup 2026-03-14: 2 file(s)
        prettier	.prettierrc	3 bytes
        lint-staged	package.json (field `lint-staged`)	3 bytes
        Full backup: .configshift/backups/configshift-2026-03-14.md
        ");
    }
}
