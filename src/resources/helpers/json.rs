//! Reading and writing JSON documents in a project tree.
use std::path::Path;

use serde_json::Value;

use super::fs::write_file;
use crate::error::{MigrationError, Result};
use crate::operations::FileSystemOps;

/// Read and parse the JSON document at `path`.
///
/// Returns `Ok(None)` when the file does not exist.
///
/// # Errors
///
/// Returns [`MigrationError::Internal`] if the file exists but cannot be read,
/// and [`MigrationError::Validation`] if it is not valid JSON.
pub fn read_json(fs: &dyn FileSystemOps, path: &Path) -> Result<Option<Value>> {
    if !fs.is_file(path) {
        return Ok(None);
    }
    let raw = fs
        .read_to_string(path)
        .map_err(|e| MigrationError::io("read", path, e))?;
    if raw.trim().is_empty() {
        return Ok(Some(Value::Object(serde_json::Map::new())));
    }
    serde_json::from_str(&raw).map(Some).map_err(|e| {
        MigrationError::validation(format!("{} is not valid JSON: {e}", path.display()))
    })
}

/// Serialize `value` with two-space indentation and a trailing newline, the
/// layout package managers and editors write themselves.
#[must_use]
pub fn to_pretty_json(value: &Value) -> String {
    let mut out = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    out.push('\n');
    out
}

/// Write `value` to `path` as pretty JSON, creating parent directories.
///
/// # Errors
///
/// Returns [`MigrationError::Internal`] if the file cannot be written.
pub fn write_json(fs: &dyn FileSystemOps, path: &Path, value: &Value) -> Result<()> {
    write_file(fs, path, &to_pretty_json(value))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::MockFileSystemOps;
    use serde_json::json;

    #[test]
    fn missing_document_is_none() {
        let fs = MockFileSystemOps::new();
        assert!(read_json(&fs, Path::new("/p/a.json")).unwrap().is_none());
    }

    #[test]
    fn empty_document_is_empty_object() {
        let fs = MockFileSystemOps::new().with_file("/p/a.json", "  \n");
        assert_eq!(
            read_json(&fs, Path::new("/p/a.json")).unwrap(),
            Some(json!({}))
        );
    }

    #[test]
    fn malformed_document_is_validation_error() {
        let fs = MockFileSystemOps::new().with_file("/p/a.json", "{ nope");
        let err = read_json(&fs, Path::new("/p/a.json")).unwrap_err();
        assert!(matches!(err, MigrationError::Validation(_)), "got {err:?}");
    }

    #[test]
    fn pretty_json_preserves_key_order_and_ends_with_newline() {
        let value: Value = serde_json::from_str(r#"{"z":1,"a":2}"#).unwrap();
        assert_eq!(to_pretty_json(&value), "{\n  \"z\": 1,\n  \"a\": 2\n}\n");
    }
}
