//! Step ledger for one run and the Markdown account rendered from it.
//!
//! A [`MigrationReport`] is created by the command handler, passed by
//! reference through the pipeline, and rendered once at the end.
use std::fmt::{self, Write as _};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::Result;
use crate::logging::Log;
use crate::operations::FileSystemOps;
use crate::resources::PackageManagerProfile;
use crate::resources::helpers::fs::{display_relative, write_file};

/// Outcome of one recorded step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// Completed as intended.
    Success,
    /// Completed with a problem worth reading.
    Warning,
    /// Failed.
    Error,
    /// Not attempted.
    Skipped,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Skipped => "skipped",
        })
    }
}

/// One recorded action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStep {
    /// What was attempted.
    pub action: String,
    /// How it ended.
    pub status: StepStatus,
    /// Free-text detail, such as a skip reason.
    pub details: Option<String>,
    /// Wall time spent.
    pub elapsed: Duration,
}

/// Per-status counts and total elapsed time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationSummary {
    /// Successful steps.
    pub success: usize,
    /// Steps ending in a warning.
    pub warnings: usize,
    /// Failed steps.
    pub errors: usize,
    /// Skipped steps.
    pub skipped: usize,
    /// Sum of step durations.
    pub elapsed: Duration,
}

impl MigrationSummary {
    /// Number of recorded steps.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.success + self.warnings + self.errors + self.skipped
    }
}

/// The ledger of one command invocation.
#[derive(Debug, Clone)]
pub struct MigrationReport {
    started: DateTime<Utc>,
    steps: Vec<MigrationStep>,
    installed_tools: Vec<String>,
    removed_tools: Vec<String>,
    created_configs: Vec<String>,
    removed_configs: Vec<String>,
    backup: Option<PathBuf>,
    profile: Option<&'static PackageManagerProfile>,
}

impl MigrationReport {
    /// Empty report for a run started at `started`.
    #[must_use]
    pub const fn new(started: DateTime<Utc>) -> Self {
        Self {
            started,
            steps: Vec::new(),
            installed_tools: Vec::new(),
            removed_tools: Vec::new(),
            created_configs: Vec::new(),
            removed_configs: Vec::new(),
            backup: None,
            profile: None,
        }
    }

    /// Append a step to the ledger.
    pub fn add_step(
        &mut self,
        action: impl Into<String>,
        status: StepStatus,
        details: Option<String>,
        elapsed: Duration,
    ) {
        self.steps.push(MigrationStep {
            action: action.into(),
            status,
            details,
            elapsed,
        });
    }

    /// Record an installed package; duplicates are ignored.
    pub fn add_installed_tool(&mut self, tool: impl Into<String>) {
        push_unique(&mut self.installed_tools, tool.into());
    }

    /// Record a removed package; duplicates are ignored.
    pub fn add_removed_tool(&mut self, tool: impl Into<String>) {
        push_unique(&mut self.removed_tools, tool.into());
    }

    /// Record a file written by the run.
    pub fn add_created_config(&mut self, path: impl Into<String>) {
        push_unique(&mut self.created_configs, path.into());
    }

    /// Record a configuration removed by the run.
    pub fn add_removed_config(&mut self, path: impl Into<String>) {
        push_unique(&mut self.removed_configs, path.into());
    }

    /// Point the report at the backup written for this run.
    pub fn set_backup(&mut self, path: PathBuf) {
        self.backup = Some(path);
    }

    /// Package manager used for the cheat-sheet commands.
    pub fn set_profile(&mut self, profile: &'static PackageManagerProfile) {
        self.profile = Some(profile);
    }

    /// Steps in the order they were recorded.
    #[must_use]
    pub fn steps(&self) -> &[MigrationStep] {
        &self.steps
    }

    /// Configurations removed so far.
    #[must_use]
    pub fn removed_configs(&self) -> &[String] {
        &self.removed_configs
    }

    /// Tally the steps.
    #[must_use]
    pub fn summary(&self) -> MigrationSummary {
        self.steps
            .iter()
            .fold(MigrationSummary::default(), |mut acc, step| {
                match step.status {
                    StepStatus::Success => acc.success += 1,
                    StepStatus::Warning => acc.warnings += 1,
                    StepStatus::Error => acc.errors += 1,
                    StepStatus::Skipped => acc.skipped += 1,
                }
                acc.elapsed += step.elapsed;
                acc
            })
    }

    /// True iff no step ended in [`StepStatus::Error`].
    #[must_use]
    pub fn is_successful(&self) -> bool {
        self.steps.iter().all(|s| s.status != StepStatus::Error)
    }

    /// Render the full Markdown report.
    #[must_use]
    pub fn generate_report(&self, root: &Path) -> String {
        let summary = self.summary();
        let mut out = String::new();
        let _ = writeln!(out, "# Migration report");
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Generated: {}",
            self.started.format("%Y-%m-%d %H:%M:%S UTC")
        );
        let _ = writeln!(out, "Project: {}", root.display());
        let _ = writeln!(
            out,
            "Result: {}",
            if self.is_successful() {
                "success"
            } else {
                "failed"
            }
        );

        let _ = writeln!(out);
        let _ = writeln!(out, "## Summary");
        let _ = writeln!(out);
        let _ = writeln!(out, "| Status | Steps |");
        let _ = writeln!(out, "|---|---|");
        let _ = writeln!(out, "| success | {} |", summary.success);
        let _ = writeln!(out, "| warning | {} |", summary.warnings);
        let _ = writeln!(out, "| error | {} |", summary.errors);
        let _ = writeln!(out, "| skipped | {} |", summary.skipped);
        let _ = writeln!(out);
        let _ = writeln!(out, "Total time: {}", format_duration(summary.elapsed));

        if !self.steps.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "## Steps");
            let _ = writeln!(out);
            let _ = writeln!(out, "| # | Action | Status | Time | Details |");
            let _ = writeln!(out, "|---|---|---|---|---|");
            for (i, step) in self.steps.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "| {} | {} | {} | {} | {} |",
                    i + 1,
                    table_cell(&step.action),
                    step.status,
                    format_duration(step.elapsed),
                    table_cell(step.details.as_deref().unwrap_or(""))
                );
            }
        }

        list_section(&mut out, "Installed tools", &self.installed_tools);
        list_section(&mut out, "Removed tools", &self.removed_tools);
        list_section(&mut out, "Created configuration", &self.created_configs);
        list_section(&mut out, "Removed configuration", &self.removed_configs);

        self.write_cheat_sheet(&mut out);

        let next: Vec<String> = self
            .steps_with(StepStatus::Warning)
            .map(|s| format!("Review \"{}\": {}", s.action, detail_or(s, "see the log")))
            .collect();
        list_section(&mut out, "Next steps", &next);

        let troubleshooting: Vec<String> = self
            .steps_with(StepStatus::Error)
            .map(|s| {
                format!(
                    "\"{}\" failed: {}. Fix the cause and rerun, or pass --force to continue past it.",
                    s.action,
                    detail_or(s, "no details recorded")
                )
            })
            .collect();
        list_section(&mut out, "Troubleshooting", &troubleshooting);

        if let Some(backup) = &self.backup {
            let _ = writeln!(out);
            let _ = writeln!(out, "## Backup");
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "The original configuration was saved to `{}`. It contains restore instructions.",
                display_relative(root, backup)
            );
        }
        out
    }

    fn steps_with(&self, status: StepStatus) -> impl Iterator<Item = &MigrationStep> {
        self.steps.iter().filter(move |s| s.status == status)
    }

    fn write_cheat_sheet(&self, out: &mut String) {
        let Some(profile) = self.profile else {
            return;
        };
        let _ = writeln!(out);
        let _ = writeln!(out, "## Commands");
        let _ = writeln!(out);
        let _ = writeln!(out, "```sh");
        let _ = writeln!(out, "# reinstall dependencies");
        let _ = writeln!(out, "{}", profile.install_command(false).join(" "));
        let _ = writeln!(out, "# CI install from the lock file");
        let _ = writeln!(out, "{}", profile.install_command(true).join(" "));
        for tool in &self.installed_tools {
            let _ = writeln!(out, "# run {tool}");
            let _ = writeln!(out, "{}", profile.dlx_command(&[tool.clone()]).join(" "));
        }
        let _ = writeln!(out, "# inspect what is left");
        let _ = writeln!(out, "configshift detect");
        let _ = writeln!(out, "```");
    }

    /// Write the report to `<root>/<prefix>-migration-report-<date>.md`.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError::Internal`](crate::error::MigrationError::Internal)
    /// if the file cannot be written.
    pub fn write_report(
        &self,
        fs: &dyn FileSystemOps,
        root: &Path,
        prefix: &str,
        date: NaiveDate,
    ) -> Result<PathBuf> {
        let path = root.join(format!(
            "{prefix}-migration-report-{}.md",
            date.format("%Y-%m-%d")
        ));
        write_file(fs, &path, &self.generate_report(root))?;
        Ok(path)
    }

    /// Log a short end-of-run summary.
    pub fn print_summary(&self, log: &dyn Log) {
        let summary = self.summary();
        log.stage("Summary");
        log.info(&format!(
            "{} step(s): {} succeeded, {} warning(s), {} error(s), {} skipped in {}",
            summary.total(),
            summary.success,
            summary.warnings,
            summary.errors,
            summary.skipped,
            format_duration(summary.elapsed)
        ));
        for step in self.steps_with(StepStatus::Error) {
            log.error(&format!("{}: {}", step.action, detail_or(step, "failed")));
        }
        if let Some(backup) = &self.backup {
            log.info(&format!("backup: {}", backup.display()));
        }
    }
}

fn push_unique(list: &mut Vec<String>, item: String) {
    if !list.contains(&item) {
        list.push(item);
    }
}

fn detail_or<'a>(step: &'a MigrationStep, fallback: &'a str) -> &'a str {
    step.details.as_deref().unwrap_or(fallback)
}

fn list_section(out: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "## {title}");
    let _ = writeln!(out);
    for item in items {
        let _ = writeln!(out, "- {item}");
    }
}

fn table_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

fn format_duration(d: Duration) -> String {
    format!("{:.2}s", d.as_secs_f64())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::RecordingLog;
    use crate::operations::MockFileSystemOps;
    use crate::resources::PackageManager;
    use chrono::TimeZone;

    fn started() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap()
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn warnings_and_skips_do_not_fail_a_run() {
        let mut report = MigrationReport::new(started());
        report.add_step("detect", StepStatus::Success, None, ms(5));
        report.add_step("backup", StepStatus::Warning, Some("overwrote".into()), ms(5));
        report.add_step("hooks", StepStatus::Skipped, None, ms(0));
        assert!(report.is_successful());

        report.add_step("install", StepStatus::Error, Some("exit 1".into()), ms(10));
        assert!(!report.is_successful());
    }

    #[test]
    fn summary_counts_and_total_time() {
        let mut report = MigrationReport::new(started());
        report.add_step("a", StepStatus::Success, None, ms(250));
        report.add_step("b", StepStatus::Success, None, ms(250));
        report.add_step("c", StepStatus::Error, None, ms(500));
        let summary = report.summary();
        assert_eq!(summary.success, 2);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.total(), 3);
        assert_eq!(summary.elapsed, ms(1000));
    }

    #[test]
    fn empty_sections_are_omitted() {
        let mut report = MigrationReport::new(started());
        report.add_step("detect", StepStatus::Success, None, ms(1));
        let doc = report.generate_report(Path::new("/p"));
        assert!(doc.contains("## Steps"));
        for section in [
            "## Installed tools",
            "## Removed tools",
            "## Next steps",
            "## Troubleshooting",
            "## Backup",
            "## Commands",
        ] {
            assert!(!doc.contains(section), "{section} should be omitted");
        }
    }

    #[test]
    fn full_report_sections() {
        let mut report = MigrationReport::new(started());
        report.set_profile(PackageManager::Pnpm.profile());
        report.add_step("remove configs", StepStatus::Success, None, ms(20));
        report.add_step(
            "merge scripts",
            StepStatus::Warning,
            Some("kept existing script lint".into()),
            ms(3),
        );
        report.add_step(
            "install tools",
            StepStatus::Error,
            Some("exit 1 | registry down".into()),
            ms(900),
        );
        report.add_installed_tool("@biomejs/biome");
        report.add_removed_tool("eslint");
        report.add_removed_config(".eslintrc.json");
        report.set_backup(PathBuf::from("/p/.configshift/backups/configshift-2026-03-14.md"));

        let doc = report.generate_report(Path::new("/p"));

        assert!(doc.contains("Result: failed"));
        assert!(doc.contains("| 3 | install tools | error | 0.90s | exit 1 \\| registry down |"));
        assert!(doc.contains("## Installed tools\n\n- @biomejs/biome\n"));
        assert!(doc.contains("## Removed configuration\n\n- .eslintrc.json\n"));
        assert!(doc.contains("pnpm install --frozen-lockfile"));
        assert!(doc.contains("pnpm dlx @biomejs/biome"));
        assert!(doc.contains("Review \"merge scripts\": kept existing script lint"));
        assert!(doc.contains("\"install tools\" failed"));
        assert!(doc.contains("`.configshift/backups/configshift-2026-03-14.md`"));
    }

    #[test]
    fn writes_dated_report_at_root() {
        let fs = MockFileSystemOps::new();
        let report = MigrationReport::new(started());
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let path = report
            .write_report(&fs, Path::new("/p"), "configshift", date)
            .unwrap();
        assert_eq!(
            path,
            PathBuf::from("/p/configshift-migration-report-2026-03-14.md")
        );
        assert!(fs.contents(&path).unwrap().starts_with("# Migration report\n"));
    }

    #[test]
    fn print_summary_reports_errors() {
        let mut report = MigrationReport::new(started());
        report.add_step("install tools", StepStatus::Error, Some("exit 1".into()), ms(1));
        let log = RecordingLog::default();
        report.print_summary(&log);
        assert_eq!(log.messages("error"), vec!["install tools: exit 1"]);
        assert_eq!(log.messages("stage"), vec!["Summary"]);
    }
}
