//! Domain-specific error types for the migration engine.
//!
//! Engine components return [`MigrationError`] through the crate-wide
//! [`Result`] alias.  Command handlers at the CLI boundary convert them to
//! [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error taxonomy
//!
//! ```text
//! MigrationError
//! ├── Validation        : malformed manifest or JSON, empty backup input, unknown tool id
//! ├── NotFound          : a required file is missing
//! ├── Internal          : I/O failure (directory creation, read, write, remove)
//! └── ExternalService   : package-manager or tool-init subprocess failure
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Convenience alias used by every engine component.
pub type Result<T> = std::result::Result<T, MigrationError>;

/// Top-level error type for the migration engine.
#[derive(Error, Debug)]
pub enum MigrationError {
    /// Input that cannot be acted on (malformed document, empty inventory, unknown id).
    #[error("validation error: {0}")]
    Validation(String),

    /// A file that was assumed to exist is missing.
    #[error("file not found: {}", path.display())]
    NotFound {
        /// Path that was expected to exist.
        path: PathBuf,
    },

    /// A filesystem operation failed.
    #[error("{context}: {source}")]
    Internal {
        /// What the engine was doing when the failure happened.
        context: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A subprocess exited unsuccessfully or could not be spawned.
    #[error("command '{command}' failed: {reason}")]
    ExternalService {
        /// The command line that was executed.
        command: String,
        /// Exit status and captured stderr, or the spawn failure.
        reason: String,
    },
}

impl MigrationError {
    /// Build a [`MigrationError::Validation`] from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MigrationError::Internal`] describing an I/O failure at `path`.
    pub fn io(action: &str, path: &Path, source: std::io::Error) -> Self {
        Self::Internal {
            context: format!("{action} {}", path.display()),
            source,
        }
    }

    /// Short, stable name of the error kind, used in reports.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "ValidationError",
            Self::NotFound { .. } => "NotFound",
            Self::Internal { .. } => "InternalError",
            Self::ExternalService { .. } => "ExternalServiceError",
        }
    }
}

/// A document that fails to (de)serialize is input the engine cannot act on.
impl From<serde_json::Error> for MigrationError {
    fn from(e: serde_json::Error) -> Self {
        Self::Validation(format!("invalid JSON: {e}"))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn validation_display() {
        let e = MigrationError::validation("no configurations to backup");
        assert_eq!(
            e.to_string(),
            "validation error: no configurations to backup"
        );
        assert_eq!(e.kind(), "ValidationError");
    }

    #[test]
    fn not_found_display() {
        let e = MigrationError::NotFound {
            path: PathBuf::from("package.json"),
        };
        assert_eq!(e.to_string(), "file not found: package.json");
        assert_eq!(e.kind(), "NotFound");
    }

    #[test]
    fn internal_display_includes_path_and_source() {
        let e = MigrationError::io(
            "remove",
            Path::new(".eslintrc.json"),
            io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        );
        let msg = e.to_string();
        assert!(msg.contains("remove .eslintrc.json"), "got: {msg}");
        assert!(msg.contains("permission denied"), "got: {msg}");
    }

    #[test]
    fn internal_has_source() {
        use std::error::Error as StdError;
        let e = MigrationError::io(
            "write",
            Path::new("x"),
            io::Error::other("disk full"),
        );
        assert!(e.source().is_some());
    }

    #[test]
    fn external_service_display() {
        let e = MigrationError::ExternalService {
            command: "pnpm remove eslint".to_string(),
            reason: "exit 1: not found".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "command 'pnpm remove eslint' failed: exit 1: not found"
        );
        assert_eq!(e.kind(), "ExternalServiceError");
    }

    #[test]
    fn json_errors_are_validation_errors() {
        let parse = serde_json::from_str::<serde_json::Value>("{ \"a\": ").expect_err("truncated");
        let e = MigrationError::from(parse);
        assert_eq!(e.kind(), "ValidationError");
        assert!(e.to_string().starts_with("validation error: invalid JSON:"), "got: {e}");
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn migration_error_is_send_sync() {
        assert_send_sync::<MigrationError>();
    }

    #[test]
    fn migration_error_converts_to_anyhow() {
        let e = MigrationError::validation("bad");
        let _anyhow_err: anyhow::Error = e.into();
    }
}
