//! Removal of superseded configuration and dependencies.
//!
//! Every operation takes a [`RunOptions`]: a dry run only reports what would
//! go, and `force` turns an individual failure into a warning so the rest of
//! the batch still runs. Without `force` the first failure aborts and leaves
//! earlier removals in place; the backup is the way back.
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::merge::remove_fields;
use crate::config::{Layout, MANIFEST_FILE, PackageManifest, ToolFamily, ToolId};
use crate::error::{MigrationError, Result};
use crate::logging::Log;
use crate::operations::FileSystemOps;
use crate::resources::helpers::fs::display_relative;
use crate::resources::helpers::json::{read_json, write_json};
use crate::resources::{BatchOutcome, Installer, RunOptions, git_config};

/// Package names superseded by the new toolchain. A trailing `*` matches any
/// suffix.
pub const DENY_PATTERNS: &[&str] = &[
    "prettier",
    "prettier-plugin-*",
    "@prettier/*",
    "eslint",
    "eslint-config-*",
    "eslint-plugin-*",
    "@eslint/*",
    "@typescript-eslint/*",
    "typescript-eslint",
    "stylelint",
    "stylelint-*",
    "markdownlint",
    "markdownlint-cli",
    "markdownlint-cli2",
    "husky",
    "lint-staged",
    "simple-git-hooks",
];

/// Packages matching a deny pattern that must stay: frameworks depend on them.
pub const ALLOW_LIST: &[&str] = &["eslint-config-next"];

fn matches_pattern(pattern: &str, name: &str) -> bool {
    pattern
        .strip_suffix('*')
        .map_or(pattern == name, |prefix| name.starts_with(prefix))
}

/// Whether `name` is superseded and not protected by [`ALLOW_LIST`] or `keep`.
#[must_use]
pub fn is_superseded(name: &str, keep: &[String]) -> bool {
    DENY_PATTERNS.iter().any(|p| matches_pattern(p, name))
        && !ALLOW_LIST.contains(&name)
        && !keep.iter().any(|k| k == name)
}

/// Superseded packages declared in either dependency map, in manifest order.
#[must_use]
pub fn superseded_dependencies(manifest: &PackageManifest, keep: &[String]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for (name, _) in manifest.all_dependencies() {
        if is_superseded(name, keep) && !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Result of [`remove_old_dependencies`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyRemoval {
    /// Packages handed to the installer.
    pub packages: Vec<String>,
    /// How the removal went.
    pub outcome: BatchOutcome,
}

/// Remove every superseded dependency in one batched installer call.
///
/// # Errors
///
/// Returns [`MigrationError::ExternalService`] if the removal fails and
/// `opts.force` is not set.
pub fn remove_old_dependencies(
    installer: &Installer<'_>,
    manifest: &PackageManifest,
    keep: &[String],
    opts: RunOptions,
) -> Result<DependencyRemoval> {
    let packages = superseded_dependencies(manifest, keep);
    let outcome = installer.remove(&packages, opts)?;
    Ok(DependencyRemoval { packages, outcome })
}

fn remove_path(fs: &dyn FileSystemOps, path: &Path) -> Result<()> {
    let removed = if fs.is_dir(path) {
        fs.remove_dir_all(path)
    } else {
        fs.remove_file(path)
    };
    removed.map_err(|e| MigrationError::io("remove", path, e))
}

/// Remove each existing path in `paths`.
///
/// Absent paths are skipped. Returns the paths that were removed, or in a dry
/// run the paths that would be.
///
/// # Errors
///
/// Returns [`MigrationError::Internal`] for the first failed removal when
/// `opts.force` is not set.
pub fn remove_old_configs(
    fs: &dyn FileSystemOps,
    log: &dyn Log,
    root: &Path,
    paths: &[PathBuf],
    opts: RunOptions,
) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for path in paths {
        if !fs.exists(path) {
            continue;
        }
        let shown = display_relative(root, path);
        if opts.dry_run {
            log.dry_run(&format!("would remove {shown}"));
            removed.push(path.clone());
            continue;
        }
        match remove_path(fs, path) {
            Ok(()) => {
                if !opts.silent {
                    log.info(&format!("removed {shown}"));
                }
                removed.push(path.clone());
            }
            Err(e) if opts.force => log.warn(&format!("{e}; continuing")),
            Err(e) => return Err(e),
        }
    }
    Ok(removed)
}

/// Strip embedded configuration keys from `package.json`.
///
/// Returns the keys that were (or would be) removed.
///
/// # Errors
///
/// Returns the field-removal error when `opts.force` is not set.
pub fn remove_embedded_configs(
    fs: &dyn FileSystemOps,
    log: &dyn Log,
    root: &Path,
    fields: &[String],
    opts: RunOptions,
) -> Result<Vec<String>> {
    if fields.is_empty() {
        return Ok(Vec::new());
    }
    match remove_fields(fs, &root.join(MANIFEST_FILE), fields, opts.dry_run) {
        Ok(removed) => {
            for key in &removed {
                if opts.dry_run {
                    log.dry_run(&format!("would remove \"{key}\" from {MANIFEST_FILE}"));
                } else if !opts.silent {
                    log.info(&format!("removed \"{key}\" from {MANIFEST_FILE}"));
                }
            }
            Ok(removed)
        }
        Err(e) if opts.force => {
            log.warn(&format!("{e}; continuing"));
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}

/// On-disk artifacts owned by `tool`: its candidate files, or its directory.
#[must_use]
pub fn tool_artifacts(root: &Path, tool: ToolId) -> Vec<PathBuf> {
    let Some(sig) = tool.signature() else {
        return Vec::new();
    };
    match sig.layout {
        Layout::Files => sig.files.iter().map(|f| root.join(f)).collect(),
        Layout::Directory(dir) => vec![root.join(dir)],
    }
}

/// What [`remove_tool_configs`] took away.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolCleanup {
    /// Files and directories removed.
    pub paths: Vec<PathBuf>,
    /// Manifest keys removed.
    pub fields: Vec<String>,
}

/// Remove one tool's artifacts without running full detection.
///
/// # Errors
///
/// Returns [`MigrationError::Validation`] for an unknown `tool_id`, and any
/// removal error when `opts.force` is not set.
pub fn remove_tool_configs(
    fs: &dyn FileSystemOps,
    log: &dyn Log,
    root: &Path,
    tool_id: &str,
    opts: RunOptions,
) -> Result<ToolCleanup> {
    let tool: ToolId = tool_id.parse()?;
    let Some(sig) = tool.signature() else {
        return Ok(ToolCleanup::default());
    };

    let paths = if sig.family == ToolFamily::GitHooks {
        remove_git_hooks(fs, log, root, tool, opts)?
    } else {
        remove_old_configs(fs, log, root, &tool_artifacts(root, tool), opts)?
    };
    let keys: Vec<String> = sig.manifest_keys.iter().map(ToString::to_string).collect();
    let fields = remove_embedded_configs(fs, log, root, &keys, opts)?;
    Ok(ToolCleanup { paths, fields })
}

/// Remove a git-hook manager's on-disk footprint.
///
/// Husky loses its directory, its `prepare` script and a `core.hooksPath`
/// pointing into it. File-based managers lose whichever of their config files
/// exist, even when they also accept a `package.json` key; a manager
/// configured only inside `package.json` has nothing on disk to remove.
///
/// # Errors
///
/// Returns any removal error when `opts.force` is not set.
pub fn remove_git_hooks(
    fs: &dyn FileSystemOps,
    log: &dyn Log,
    root: &Path,
    manager: ToolId,
    opts: RunOptions,
) -> Result<Vec<PathBuf>> {
    let Some(sig) = manager.signature() else {
        return Ok(Vec::new());
    };
    match sig.layout {
        Layout::Directory(dir) => {
            let removed = remove_old_configs(fs, log, root, &[root.join(dir)], opts)?;
            if manager == ToolId::Husky {
                remove_husky_leftovers(fs, log, root, dir, opts)?;
            }
            Ok(removed)
        }
        Layout::Files => {
            let removed =
                remove_old_configs(fs, log, root, &tool_artifacts(root, manager), opts)?;
            if removed.is_empty() && !sig.manifest_keys.is_empty() {
                log.debug(&format!(
                    "{} is configured in {MANIFEST_FILE}; nothing to remove on disk",
                    sig.name
                ));
            }
            Ok(removed)
        }
    }
}

fn remove_husky_leftovers(
    fs: &dyn FileSystemOps,
    log: &dyn Log,
    root: &Path,
    dir: &str,
    opts: RunOptions,
) -> Result<()> {
    let result = drop_prepare_script(fs, log, root, opts).and_then(|()| {
        if opts.dry_run {
            if matches!(
                git_config::hooks_path_state(root, dir)?,
                git_config::HooksPathState::Managed(_)
            ) {
                log.dry_run("would unset core.hooksPath");
            }
            return Ok(());
        }
        if git_config::unset_managed_hooks_path(root, dir)? && !opts.silent {
            log.info("unset core.hooksPath");
        }
        Ok(())
    });
    match result {
        Err(e) if opts.force => {
            log.warn(&format!("{e}; continuing"));
            Ok(())
        }
        other => other,
    }
}

/// Drop a `prepare` script that only exists to install Husky.
fn drop_prepare_script(
    fs: &dyn FileSystemOps,
    log: &dyn Log,
    root: &Path,
    opts: RunOptions,
) -> Result<()> {
    let path = root.join(MANIFEST_FILE);
    let Some(Value::Object(mut doc)) = read_json(fs, &path)? else {
        return Ok(());
    };
    let Some(Value::Object(scripts)) = doc.get_mut("scripts") else {
        return Ok(());
    };
    let invokes_husky = scripts
        .get("prepare")
        .and_then(Value::as_str)
        .is_some_and(|cmd| cmd.contains("husky"));
    if !invokes_husky {
        return Ok(());
    }
    if opts.dry_run {
        log.dry_run("would remove the husky \"prepare\" script");
        return Ok(());
    }
    scripts.shift_remove("prepare");
    write_json(fs, &path, &Value::Object(doc))?;
    if !opts.silent {
        log.info("removed the husky \"prepare\" script");
    }
    Ok(())
}
