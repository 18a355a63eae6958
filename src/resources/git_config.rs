//! Repository-local git config: the `core.hooksPath` entry hook managers set.
use std::path::Path;

use git2::{ConfigLevel, ErrorCode, Repository};

use crate::error::{MigrationError, Result};

const HOOKS_PATH: &str = "core.hooksPath";

/// Current state of `core.hooksPath` in a project's repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HooksPathState {
    /// The project is not a git repository, or the key is not set locally.
    Unset,
    /// Points into `dir`, the hook manager's directory.
    Managed(String),
    /// Points somewhere the migration does not own.
    Foreign(String),
}

fn git_error(action: &str, e: &git2::Error) -> MigrationError {
    MigrationError::ExternalService {
        command: format!("git config {action} {HOOKS_PATH}"),
        reason: e.message().to_string(),
    }
}

fn open(root: &Path) -> Result<Option<Repository>> {
    if !root.join(".git").exists() {
        return Ok(None);
    }
    match Repository::open(root) {
        Ok(repo) => Ok(Some(repo)),
        Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
        Err(e) => Err(git_error("--get", &e)),
    }
}

/// Read `core.hooksPath` from the repository at `root` and classify it
/// against the hook directory `dir` (e.g. `.husky`).
///
/// # Errors
///
/// Returns [`MigrationError::ExternalService`] if the repository or its
/// config cannot be opened.
pub fn hooks_path_state(root: &Path, dir: &str) -> Result<HooksPathState> {
    let Some(repo) = open(root)? else {
        return Ok(HooksPathState::Unset);
    };
    let config = repo
        .config()
        .and_then(|c| c.open_level(ConfigLevel::Local))
        .map_err(|e| git_error("--get", &e))?;
    match config.get_string(HOOKS_PATH) {
        Ok(value) => {
            let trimmed = value.trim_start_matches("./");
            if trimmed == dir || trimmed.starts_with(&format!("{dir}/")) {
                Ok(HooksPathState::Managed(value))
            } else {
                Ok(HooksPathState::Foreign(value))
            }
        }
        Err(e) if e.code() == ErrorCode::NotFound => Ok(HooksPathState::Unset),
        Err(e) => Err(git_error("--get", &e)),
    }
}

/// Remove `core.hooksPath` from the repository-local config when it points
/// into `dir`. Returns `true` if the entry was removed.
///
/// # Errors
///
/// Returns [`MigrationError::ExternalService`] if the config cannot be
/// opened or written.
pub fn unset_managed_hooks_path(root: &Path, dir: &str) -> Result<bool> {
    if !matches!(hooks_path_state(root, dir)?, HooksPathState::Managed(_)) {
        return Ok(false);
    }
    let Some(repo) = open(root)? else {
        return Ok(false);
    };
    let mut config = repo
        .config()
        .and_then(|c| c.open_level(ConfigLevel::Local))
        .map_err(|e| git_error("--unset", &e))?;
    config
        .remove(HOOKS_PATH)
        .map_err(|e| git_error("--unset", &e))?;
    Ok(true)
}
