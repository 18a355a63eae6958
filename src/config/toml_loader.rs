//! TOML configuration file parsing.
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::error::{MigrationError, Result};
use crate::operations::FileSystemOps;

/// Load and deserialize a TOML file.
///
/// A missing file deserializes from empty TOML, so types whose fields are
/// all `#[serde(default)]` come back as their defaults.
///
/// # Errors
///
/// Returns [`MigrationError::Internal`] if the file exists but cannot be read,
/// and [`MigrationError::Validation`] if it cannot be parsed.
pub fn load_config<T: DeserializeOwned>(fs: &dyn FileSystemOps, path: &Path) -> Result<T> {
    let content = if fs.is_file(path) {
        fs.read_to_string(path)
            .map_err(|e| MigrationError::io("read config file", path, e))?
    } else {
        String::new()
    };

    toml::from_str(&content).map_err(|e| {
        MigrationError::validation(format!(
            "failed to parse TOML config {}: {}",
            path.display(),
            e.message()
        ))
    })
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::MockFileSystemOps;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default)]
    struct Sample {
        name: String,
        items: Vec<String>,
    }

    #[test]
    fn missing_file_yields_defaults() {
        let fs = MockFileSystemOps::new();
        let sample: Sample = load_config(&fs, Path::new("/p/x.toml")).unwrap();
        assert_eq!(sample, Sample::default());
    }

    #[test]
    fn parses_present_file() {
        let fs = MockFileSystemOps::new().with_file("/p/x.toml", "name = \"a\"\nitems = [\"b\"]\n");
        let sample: Sample = load_config(&fs, Path::new("/p/x.toml")).unwrap();
        assert_eq!(sample.name, "a");
        assert_eq!(sample.items, vec!["b"]);
    }

    #[test]
    fn invalid_toml_is_validation_error() {
        let fs = MockFileSystemOps::new().with_file("/p/x.toml", "name = ");
        let err = load_config::<Sample>(&fs, Path::new("/p/x.toml")).unwrap_err();
        assert!(matches!(err, MigrationError::Validation(_)), "got {err:?}");
        assert!(err.to_string().contains("x.toml"));
    }
}
