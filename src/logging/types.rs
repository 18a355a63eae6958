//! The [`Log`] trait shared by the logger and engine components, plus the
//! run-level settings the subscriber is built from.
use std::fmt::Write as _;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing_subscriber::filter::LevelFilter;

/// Tracing target of stage headers.
pub(super) const STAGE_TARGET: &str = "configshift::stage";

/// Tracing target of dry-run action lines.
pub(super) const DRY_RUN_TARGET: &str = "configshift::dry_run";

/// Abstraction over logging backends.
///
/// Engine components log through `&dyn Log` so they never depend on how
/// output is rendered.  [`Logger`](super::logger::Logger) is the production
/// implementation.
pub trait Log: Send + Sync + std::fmt::Debug {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
}

/// How much reaches the console. The log file always records everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Warnings and errors only (`--silent`).
    Quiet,
    /// Stages, progress and dry-run lines.
    Normal,
    /// Everything, including debug detail (`-v`).
    Verbose,
}

impl Verbosity {
    /// Combine the command-line switches; `--silent` wins over `-v`.
    #[must_use]
    pub const fn from_flags(verbose: bool, silent: bool) -> Self {
        if silent {
            Self::Quiet
        } else if verbose {
            Self::Verbose
        } else {
            Self::Normal
        }
    }

    /// Level filter for the console layer.
    pub(super) const fn console_filter(self) -> LevelFilter {
        match self {
            Self::Quiet => LevelFilter::WARN,
            Self::Normal => LevelFilter::INFO,
            Self::Verbose => LevelFilter::DEBUG,
        }
    }
}

/// Identifies one run at the top of its log file.
#[derive(Debug, Clone)]
pub struct RunHeader {
    /// Subcommand name; also names the log file.
    pub command: String,
    /// Project the command was pointed at.
    pub root: PathBuf,
    /// Whether `--dry-run` was given.
    pub dry_run: bool,
    /// Whether `--force` was given.
    pub force: bool,
}

impl RunHeader {
    /// Text written at the start of the log file.
    pub(super) fn render(&self, version: &str, started: DateTime<Utc>) -> String {
        let mode = match (self.dry_run, self.force) {
            (true, true) => "dry run, force",
            (true, false) => "dry run",
            (false, true) => "apply, force",
            (false, false) => "apply",
        };
        let mut out = String::new();
        let _ = writeln!(out, "== configshift {version} {} ==", self.command);
        let _ = writeln!(out, "started: {}", started.format("%Y-%m-%d %H:%M:%S UTC"));
        let _ = writeln!(out, "root:    {}", self.root.display());
        let _ = writeln!(out, "mode:    {mode}");
        out
    }
}
