//! Project-level `configshift.toml` settings.
//!
//! Every field has a default, so a project without a settings file migrates
//! to the built-in target toolchain (Biome) with backups under
//! `.configshift/backups`.
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use super::toml_loader::load_config;
use crate::error::{MigrationError, Result};
use crate::operations::FileSystemOps;

/// Default settings file name, looked up in the project root.
pub const SETTINGS_FILE: &str = "configshift.toml";

/// All user-tunable settings for one run.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Directory (relative to the project root) that receives backups.
    pub backup_dir: PathBuf,
    /// File-name prefix for backups and reports.
    pub prefix: String,
    /// Whether backups carry a restoration-instructions section.
    pub backup_instructions: bool,
    /// Packages that must survive dependency cleanup.
    pub keep: Vec<String>,
    /// New tooling to bring in.
    pub install: InstallSettings,
    /// Script-map fragment merged into `package.json`.
    pub scripts: toml::Table,
    /// Editor settings to merge.
    pub editor: EditorSettings,
}

/// New tooling to bring in.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct InstallSettings {
    /// Packages added as dev dependencies.
    pub packages: Vec<String>,
    /// Tool init commands, run through the package manager's dlx prefix.
    pub init: Vec<Vec<String>>,
}

/// Editor-integration fragments.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EditorSettings {
    /// Fragment merged into `.vscode/settings.json`.
    pub settings: toml::Table,
    /// Extensions added to `recommendations`.
    pub recommendations: Vec<String>,
    /// Superseded extensions moved to `unwantedRecommendations`.
    pub unwanted: Vec<String>,
}

fn table(entries: impl IntoIterator<Item = (&'static str, toml::Value)>) -> toml::Table {
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backup_dir: PathBuf::from(".configshift/backups"),
            prefix: "configshift".to_string(),
            backup_instructions: true,
            keep: Vec::new(),
            install: InstallSettings::default(),
            scripts: table([
                ("lint", "biome lint .".into()),
                ("format", "biome format --write .".into()),
                ("check", "biome check .".into()),
            ]),
            editor: EditorSettings::default(),
        }
    }
}

impl Default for InstallSettings {
    fn default() -> Self {
        Self {
            packages: strings(&["@biomejs/biome"]),
            init: vec![strings(&["@biomejs/biome", "init"])],
        }
    }
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            settings: table([
                ("editor.defaultFormatter", "biomejs.biome".into()),
                ("editor.formatOnSave", true.into()),
                (
                    "editor.codeActionsOnSave",
                    toml::Value::Table(table([
                        ("source.fixAll.biome", "explicit".into()),
                        ("source.organizeImports.biome", "explicit".into()),
                    ])),
                ),
            ]),
            recommendations: strings(&["biomejs.biome"]),
            unwanted: strings(&[
                "esbenp.prettier-vscode",
                "dbaeumer.vscode-eslint",
                "stylelint.vscode-stylelint",
                "DavidAnson.vscode-markdownlint",
            ]),
        }
    }
}

impl Settings {
    /// Load settings for the project at `root`.
    ///
    /// With `explicit = Some(path)` the file must exist; otherwise
    /// `<root>/configshift.toml` is used when present and the built-in
    /// defaults when not.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError::NotFound`] if an explicit settings file is
    /// missing, or any error from parsing the file.
    pub fn load(fs: &dyn FileSystemOps, root: &Path, explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(p) if !fs.is_file(p) => {
                return Err(MigrationError::NotFound {
                    path: p.to_path_buf(),
                });
            }
            Some(p) => p.to_path_buf(),
            None => root.join(SETTINGS_FILE),
        };
        let settings: Self = load_config(fs, &path)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.prefix.trim().is_empty() || self.prefix.contains(['/', '\\']) {
            return Err(MigrationError::validation(format!(
                "prefix '{}' must be a non-empty file-name fragment",
                self.prefix
            )));
        }
        if let Some(empty) = self.install.init.iter().position(Vec::is_empty) {
            return Err(MigrationError::validation(format!(
                "install.init entry {empty} is an empty command"
            )));
        }
        Ok(())
    }

    /// Absolute backup directory for a project rooted at `root`.
    #[must_use]
    pub fn backup_dir_in(&self, root: &Path) -> PathBuf {
        root.join(&self.backup_dir)
    }

    /// The `[scripts]` table as a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError::Validation`] if the table holds values with
    /// no JSON equivalent.
    pub fn scripts_json(&self) -> Result<Value> {
        table_to_json("scripts", &self.scripts)
    }

    /// The `[editor.settings]` table as a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError::Validation`] if the table holds values with
    /// no JSON equivalent.
    pub fn editor_settings_json(&self) -> Result<Value> {
        table_to_json("editor.settings", &self.editor.settings)
    }
}

fn table_to_json(name: &str, table: &toml::Table) -> Result<Value> {
    serde_json::to_value(table)
        .map_err(|e| MigrationError::validation(format!("[{name}] cannot be converted: {e}")))
}
