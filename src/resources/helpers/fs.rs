//! File-system helpers layered over [`FileSystemOps`].
use std::path::Path;

use crate::error::{MigrationError, Result};
use crate::operations::FileSystemOps;

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns [`MigrationError::Internal`] if the directory cannot be created.
pub fn ensure_parent_dir(fs: &dyn FileSystemOps, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !fs.is_dir(parent)
    {
        fs.create_dir_all(parent)
            .map_err(|e| MigrationError::io("create directory", parent, e))?;
    }
    Ok(())
}

/// Write `contents` to `path`, creating parent directories first.
///
/// # Errors
///
/// Returns [`MigrationError::Internal`] if a directory or the file cannot be
/// written.
pub fn write_file(fs: &dyn FileSystemOps, path: &Path, contents: &str) -> Result<()> {
    ensure_parent_dir(fs, path)?;
    fs.write(path, contents)
        .map_err(|e| MigrationError::io("write", path, e))
}

/// Read an optional file: a file that is missing or unreadable is treated as
/// absent rather than as an error.
#[must_use]
pub fn read_optional(fs: &dyn FileSystemOps, path: &Path) -> Option<String> {
    if !fs.is_file(path) {
        return None;
    }
    fs.read_to_string(path).ok()
}

/// Render `path` relative to `root` with forward slashes, for reports and
/// backups that must read the same on every platform.
#[must_use]
pub fn display_relative(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::{MockFileSystemOps, SystemFileSystemOps};
    use std::path::PathBuf;

    #[test]
    fn write_file_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a/b/c.md");
        write_file(&SystemFileSystemOps, &target, "hello").unwrap();
        assert_eq!(std::fs::read_to_string(target).unwrap(), "hello");
    }

    #[test]
    fn read_optional_missing_is_none() {
        let fs = MockFileSystemOps::new();
        assert!(read_optional(&fs, Path::new("/p/.prettierrc")).is_none());
    }

    #[test]
    fn read_optional_directory_is_none() {
        let fs = MockFileSystemOps::new().with_dir("/p/.prettierrc");
        assert!(read_optional(&fs, Path::new("/p/.prettierrc")).is_none());
    }

    #[test]
    fn read_optional_reads_file() {
        let fs = MockFileSystemOps::new().with_file("/p/.prettierrc", "{}");
        assert_eq!(
            read_optional(&fs, Path::new("/p/.prettierrc")).as_deref(),
            Some("{}")
        );
    }

    #[test]
    fn display_relative_uses_forward_slashes() {
        let root = PathBuf::from("/proj");
        let path = root.join(".husky").join("pre-commit");
        assert_eq!(display_relative(&root, &path), ".husky/pre-commit");
    }

    #[test]
    fn display_relative_keeps_foreign_paths() {
        assert_eq!(
            display_relative(Path::new("/proj"), Path::new("other/file")),
            "other/file"
        );
    }
}
