//! Log-file placement and the line layouts of the console and the log file.
use std::ffi::OsString;
use std::path::PathBuf;

use tracing::Level;

use super::types::{DRY_RUN_TARGET, STAGE_TARGET};

/// What a line is, derived from an event's level and target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum LineKind {
    Stage,
    DryRun,
    Info,
    Debug,
    Warn,
    Error,
}

impl LineKind {
    pub(super) fn of(level: Level, target: &str) -> Self {
        match level {
            Level::ERROR => Self::Error,
            Level::WARN => Self::Warn,
            Level::INFO if target == STAGE_TARGET => Self::Stage,
            Level::INFO if target == DRY_RUN_TARGET => Self::DryRun,
            Level::INFO => Self::Info,
            _ => Self::Debug,
        }
    }
}

/// Coloured console rendering.
pub(super) fn console_line(kind: LineKind, msg: &str) -> String {
    match kind {
        LineKind::Error => format!("\x1b[31mERROR\x1b[0m {msg}"),
        LineKind::Warn => format!("\x1b[33mWARN\x1b[0m  {msg}"),
        LineKind::Stage => format!("\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m"),
        LineKind::DryRun => format!("  \x1b[33m[DRY RUN]\x1b[0m {msg}"),
        LineKind::Info => format!("  {msg}"),
        LineKind::Debug => format!("  \x1b[2m{msg}\x1b[0m"),
    }
}

/// Plain log-file rendering, stamped with `time`.
///
/// Messages may carry subprocess stderr, so escape sequences are stripped.
pub(super) fn file_line(kind: LineKind, msg: &str, time: &str) -> String {
    let msg = strip_ansi(msg);
    let tag = match kind {
        LineKind::Stage => return format!("[{time}] ==> {msg}"),
        LineKind::DryRun => "[dry run] ",
        LineKind::Error => "[error] ",
        LineKind::Warn => "[warn] ",
        LineKind::Debug => "[debug] ",
        LineKind::Info => "",
    };
    format!("[{time}]     {tag}{msg}")
}

/// Remove escape sequences: a CSI sequence runs to its final byte in
/// `@`..=`~`, any other escape is two characters.
fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\x1b' {
            out.push(c);
            continue;
        }
        if chars.next_if_eq(&'[').is_some() {
            for inner in chars.by_ref() {
                if ('@'..='~').contains(&inner) {
                    break;
                }
            }
        } else {
            chars.next();
        }
    }
    out
}

/// `<xdg_cache>/configshift`, falling back to `<home>/.cache/configshift`.
pub(super) fn log_dir(xdg_cache: Option<OsString>, home: Option<OsString>) -> PathBuf {
    xdg_cache
        .filter(|dir| !dir.is_empty())
        .map_or_else(
            || home.map_or_else(|| PathBuf::from("."), PathBuf::from).join(".cache"),
            PathBuf::from,
        )
        .join("configshift")
}

/// Log file of `command` under the user's cache directory.
pub(super) fn log_file_path(command: &str) -> PathBuf {
    let home = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE"));
    log_dir(std::env::var_os("XDG_CACHE_HOME"), home).join(format!("{command}.log"))
}
