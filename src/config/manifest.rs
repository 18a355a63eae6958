//! The project's `package.json`: dependency maps, scripts, and embedded
//! tool configuration.
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::{MigrationError, Result};
use crate::operations::FileSystemOps;
use crate::resources::helpers::json::read_json;

/// File name of the project manifest.
pub const MANIFEST_FILE: &str = "package.json";

/// Which dependency map a package was declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    /// `dependencies`
    Direct,
    /// `devDependencies`
    Dev,
}

impl DependencyKind {
    /// The manifest key holding this dependency map.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Direct => "dependencies",
            Self::Dev => "devDependencies",
        }
    }
}

/// A parsed `package.json`.
#[derive(Debug, Clone)]
pub struct PackageManifest {
    path: PathBuf,
    doc: Map<String, Value>,
}

impl PackageManifest {
    /// Load `<root>/package.json`.
    ///
    /// Returns `Ok(None)` if the project has no manifest.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError::Validation`] if the manifest is not a JSON
    /// object, and [`MigrationError::Internal`] if it cannot be read.
    pub fn load(fs: &dyn FileSystemOps, root: &Path) -> Result<Option<Self>> {
        let path = root.join(MANIFEST_FILE);
        match read_json(fs, &path)? {
            None => Ok(None),
            Some(Value::Object(doc)) => Ok(Some(Self { path, doc })),
            Some(_) => Err(MigrationError::validation(format!(
                "{} must contain a JSON object",
                path.display()
            ))),
        }
    }

    /// Load `<root>/package.json`, failing if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError::NotFound`] if there is no manifest, or any
    /// error from [`load`](Self::load).
    pub fn require(fs: &dyn FileSystemOps, root: &Path) -> Result<Self> {
        Self::load(fs, root)?.ok_or_else(|| MigrationError::NotFound {
            path: root.join(MANIFEST_FILE),
        })
    }

    /// Path of the manifest file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Value of a top-level key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.doc.get(key)
    }

    /// Names declared in one dependency map, in manifest order.
    #[must_use]
    pub fn dependencies(&self, kind: DependencyKind) -> Vec<&str> {
        self.doc
            .get(kind.key())
            .and_then(Value::as_object)
            .map(|deps| deps.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Names from `dependencies` followed by `devDependencies`.
    #[must_use]
    pub fn all_dependencies(&self) -> Vec<(&str, DependencyKind)> {
        [DependencyKind::Direct, DependencyKind::Dev]
            .into_iter()
            .flat_map(|kind| self.dependencies(kind).into_iter().map(move |n| (n, kind)))
            .collect()
    }

    /// Whether `name` appears in either dependency map.
    #[must_use]
    pub fn has_dependency(&self, name: &str) -> bool {
        self.all_dependencies().iter().any(|(n, _)| *n == name)
    }
}
