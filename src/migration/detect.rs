//! Inventory of a project's existing tooling configuration.
//!
//! [`detect`] walks the [`SIGNATURES`] table once: candidate files are read
//! when present, directory-owning tools contribute every file directly inside
//! their directory, and keys embedded in `package.json` become entries whose
//! path is the manifest itself. The narrower probes ([`has_typescript`],
//! [`has_stylesheets`], [`active_hook_manager`]) decide which later stages
//! apply to the project at all.
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::config::{Layout, PackageManifest, SIGNATURES, ToolId};
use crate::error::Result;
use crate::operations::FileSystemOps;
use crate::resources::helpers::fs::read_optional;
use crate::resources::helpers::json::to_pretty_json;

/// Directories never descended into by the style-sheet scan.
const SKIPPED_DIRS: &[&str] = &["node_modules", ".git", "dist", "build", "coverage"];

/// Style-sheet extensions that make a style linter relevant.
const STYLESHEET_EXTENSIONS: &[&str] = &["css", "scss", "sass", "less"];

/// Bound on directory recursion so symlink cycles cannot hang the scan.
const MAX_SCAN_DEPTH: usize = 16;

/// One configuration artifact as it existed when it was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedConfig {
    /// Tool the configuration belongs to.
    pub tool: ToolId,
    /// File the content came from. For embedded configuration this is the
    /// manifest, which several entries may share.
    pub path: PathBuf,
    /// Raw configuration text.
    pub content: String,
    /// Manifest key the content was taken from, for embedded configuration.
    pub field: Option<String>,
}

impl DetectedConfig {
    /// Whether this entry lives inside `package.json` rather than its own file.
    #[must_use]
    pub const fn is_embedded(&self) -> bool {
        self.field.is_some()
    }
}

/// Everything [`detect`] found, in signature-table order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolInventory {
    /// Whether anything was found.
    pub has_configs: bool,
    /// Tools with at least one configuration.
    pub tools: BTreeSet<ToolId>,
    /// Every configuration, in detection order.
    pub configs: Vec<DetectedConfig>,
}

impl ToolInventory {
    fn push(&mut self, config: DetectedConfig) {
        self.has_configs = true;
        self.tools.insert(config.tool);
        self.configs.push(config);
    }

    /// Entries detected for `tool`.
    pub fn configs_for(&self, tool: ToolId) -> impl Iterator<Item = &DetectedConfig> {
        self.configs.iter().filter(move |c| c.tool == tool)
    }

    /// Standalone configuration files of file-layout tools. The manifest and
    /// files inside a tool-owned directory are excluded.
    #[must_use]
    pub fn standalone_paths(&self) -> Vec<PathBuf> {
        self.configs
            .iter()
            .filter(|c| !c.is_embedded())
            .filter(|c| c.tool.signature().is_some_and(|s| s.layout == Layout::Files))
            .map(|c| c.path.clone())
            .collect()
    }

    /// The part of this inventory that belongs to `tool`.
    #[must_use]
    pub fn only(&self, tool: ToolId) -> Self {
        let mut narrowed = Self::default();
        for config in self.configs_for(tool) {
            narrowed.push(config.clone());
        }
        narrowed
    }

    /// Manifest keys holding embedded configuration.
    #[must_use]
    pub fn embedded_fields(&self) -> Vec<String> {
        self.configs.iter().filter_map(|c| c.field.clone()).collect()
    }
}

/// Scan the project at `root` for every registered tool signature.
///
/// # Errors
///
/// Returns [`MigrationError::Validation`](crate::error::MigrationError::Validation)
/// if `package.json` exists but cannot be parsed. Unreadable optional files
/// are treated as absent.
pub fn detect(fs: &dyn FileSystemOps, root: &Path) -> Result<ToolInventory> {
    let manifest = PackageManifest::load(fs, root)?;
    let mut inventory = ToolInventory::default();

    for sig in SIGNATURES {
        let candidates = match sig.layout {
            Layout::Files => sig.files.iter().map(|f| root.join(f)).collect(),
            Layout::Directory(dir) => directory_files(fs, &root.join(dir)),
        };
        for path in candidates {
            if let Some(content) = read_optional(fs, &path) {
                inventory.push(DetectedConfig {
                    tool: sig.tool,
                    path,
                    content,
                    field: None,
                });
            }
        }

        let Some(manifest) = &manifest else { continue };
        for key in sig.manifest_keys {
            if let Some(value) = manifest.get(key) {
                inventory.push(DetectedConfig {
                    tool: sig.tool,
                    path: manifest.path().to_path_buf(),
                    content: to_pretty_json(value),
                    field: Some((*key).to_string()),
                });
            }
        }
    }

    Ok(inventory)
}

/// Regular files directly inside `dir`; subdirectories (such as Husky's
/// generated `_/`) are skipped.
fn directory_files(fs: &dyn FileSystemOps, dir: &Path) -> Vec<PathBuf> {
    if !fs.is_dir(dir) {
        return Vec::new();
    }
    fs.read_dir(dir)
        .map(|entries| entries.into_iter().filter(|p| fs.is_file(p)).collect())
        .unwrap_or_default()
}

/// Whether the project uses TypeScript: a `tsconfig.json` or a declared
/// `typescript` dependency.
#[must_use]
pub fn has_typescript(
    fs: &dyn FileSystemOps,
    root: &Path,
    manifest: Option<&PackageManifest>,
) -> bool {
    fs.is_file(&root.join("tsconfig.json"))
        || manifest.is_some_and(|m| m.has_dependency("typescript"))
}

/// Whether any style sheet exists below `root`, ignoring dependency and
/// build-output directories.
#[must_use]
pub fn has_stylesheets(fs: &dyn FileSystemOps, root: &Path) -> bool {
    scan_for_stylesheets(fs, root, 0)
}

fn scan_for_stylesheets(fs: &dyn FileSystemOps, dir: &Path, depth: usize) -> bool {
    if depth > MAX_SCAN_DEPTH {
        return false;
    }
    let Ok(entries) = fs.read_dir(dir) else {
        return false;
    };
    entries.iter().any(|path| {
        if fs.is_dir(path) {
            let skipped = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| SKIPPED_DIRS.contains(&n));
            !skipped && scan_for_stylesheets(fs, path, depth + 1)
        } else {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| STYLESHEET_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        }
    })
}

/// The git-hook manager in charge of the project, if any.
///
/// Precedence: a `.husky/` directory, then a Lefthook config file, then
/// simple-git-hooks (manifest key or config file).
#[must_use]
pub fn active_hook_manager(
    fs: &dyn FileSystemOps,
    root: &Path,
    manifest: Option<&PackageManifest>,
) -> Option<ToolId> {
    [ToolId::Husky, ToolId::Lefthook, ToolId::SimpleGitHooks]
        .into_iter()
        .find(|tool| {
            let Some(sig) = tool.signature() else {
                return false;
            };
            let on_disk = match sig.layout {
                Layout::Directory(dir) => fs.is_dir(&root.join(dir)),
                Layout::Files => sig.files.iter().any(|f| fs.is_file(&root.join(f))),
            };
            on_disk
                || manifest.is_some_and(|m| sig.manifest_keys.iter().any(|k| m.get(k).is_some()))
        })
}

/// Project characteristics gathered alongside the inventory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectProbes {
    /// A `tsconfig.json` exists.
    pub typescript: bool,
    /// Stylesheets exist outside `node_modules`.
    pub stylesheets: bool,
    /// Git-hook manager in use, if any.
    pub hook_manager: Option<ToolId>,
}

impl ProjectProbes {
    /// Run every probe against the project at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError::Validation`](crate::error::MigrationError::Validation)
    /// if `package.json` exists but cannot be parsed.
    pub fn collect(fs: &dyn FileSystemOps, root: &Path) -> Result<Self> {
        let manifest = PackageManifest::load(fs, root)?;
        Ok(Self {
            typescript: has_typescript(fs, root, manifest.as_ref()),
            stylesheets: has_stylesheets(fs, root),
            hook_manager: active_hook_manager(fs, root, manifest.as_ref()),
        })
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::error::MigrationError;
    use crate::operations::MockFileSystemOps;

    fn root() -> &'static Path {
        Path::new("/p")
    }

    #[test]
    fn empty_project_has_no_configs() {
        let inventory = detect(&MockFileSystemOps::new().with_dir("/p"), root()).unwrap();
        assert!(!inventory.has_configs);
        assert!(inventory.tools.is_empty());
        assert!(inventory.configs.is_empty());
    }

    #[test]
    fn detects_files_in_signature_order() {
        let fs = MockFileSystemOps::new()
            .with_file("/p/.eslintrc.json", "{\"root\":true}")
            .with_file("/p/.prettierrc", "{}")
            .with_file("/p/.prettierignore", "dist\n");
        let inventory = detect(&fs, root()).unwrap();

        let paths: Vec<_> = inventory.configs.iter().map(|c| c.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/p/.prettierrc"),
                PathBuf::from("/p/.prettierignore"),
                PathBuf::from("/p/.eslintrc.json"),
            ]
        );
        assert_eq!(
            inventory.tools,
            BTreeSet::from([ToolId::Prettier, ToolId::Eslint])
        );
        assert_eq!(inventory.configs[2].content, "{\"root\":true}");
    }

    #[test]
    fn embedded_fields_share_the_manifest_path() {
        let fs = MockFileSystemOps::new().with_file(
            "/p/package.json",
            r#"{"prettier":{"semi":false},"eslintConfig":{"extends":"next"}}"#,
        );
        let inventory = detect(&fs, root()).unwrap();

        assert_eq!(inventory.configs.len(), 2);
        assert!(inventory.configs.iter().all(DetectedConfig::is_embedded));
        assert!(
            inventory
                .configs
                .iter()
                .all(|c| c.path == Path::new("/p/package.json"))
        );
        assert_eq!(inventory.embedded_fields(), vec!["prettier", "eslintConfig"]);
        assert!(inventory.standalone_paths().is_empty());
        assert!(inventory.configs[0].content.contains("\"semi\": false"));
    }

    #[test]
    fn malformed_manifest_aborts_detection() {
        let fs = MockFileSystemOps::new()
            .with_file("/p/.prettierrc", "{}")
            .with_file("/p/package.json", "{ not json");
        let err = detect(&fs, root()).unwrap_err();
        assert!(matches!(err, MigrationError::Validation(_)), "got {err:?}");
    }

    #[test]
    fn husky_contributes_direct_children_only() {
        let fs = MockFileSystemOps::new()
            .with_dir("/p/.husky")
            .with_file("/p/.husky/pre-commit", "npx lint-staged\n")
            .with_dir("/p/.husky/_")
            .with_file("/p/.husky/_/husky.sh", "#!/bin/sh\n");
        let inventory = detect(&fs, root()).unwrap();

        let husky: Vec<_> = inventory.configs_for(ToolId::Husky).collect();
        assert_eq!(husky.len(), 1);
        assert_eq!(husky[0].path, PathBuf::from("/p/.husky/pre-commit"));
        assert!(inventory.standalone_paths().is_empty());
    }

    #[test]
    fn typescript_probe_checks_tsconfig_and_dependency() {
        let fs = MockFileSystemOps::new().with_file("/p/tsconfig.json", "{}");
        assert!(has_typescript(&fs, root(), None));

        let fs = MockFileSystemOps::new()
            .with_file("/p/package.json", r#"{"devDependencies":{"typescript":"^5"}}"#);
        let manifest = PackageManifest::load(&fs, root()).unwrap();
        assert!(has_typescript(&fs, root(), manifest.as_ref()));

        assert!(!has_typescript(&MockFileSystemOps::new(), root(), None));
    }

    #[test]
    fn stylesheet_probe_skips_node_modules() {
        let fs = MockFileSystemOps::new()
            .with_dir("/p")
            .with_dir("/p/node_modules")
            .with_file("/p/node_modules/lib.css", "");
        assert!(!has_stylesheets(&fs, root()));

        let fs = MockFileSystemOps::new()
            .with_dir("/p")
            .with_dir("/p/src")
            .with_dir("/p/src/styles")
            .with_file("/p/src/styles/app.SCSS", "");
        assert!(has_stylesheets(&fs, root()));
    }

    #[test]
    fn hook_manager_precedence() {
        let fs = MockFileSystemOps::new()
            .with_dir("/p/.husky")
            .with_file("/p/lefthook.yml", "pre-commit:\n");
        assert_eq!(active_hook_manager(&fs, root(), None), Some(ToolId::Husky));

        let fs = MockFileSystemOps::new().with_file("/p/lefthook.yml", "pre-commit:\n");
        assert_eq!(
            active_hook_manager(&fs, root(), None),
            Some(ToolId::Lefthook)
        );

        let fs = MockFileSystemOps::new().with_file(
            "/p/package.json",
            r#"{"simple-git-hooks":{"pre-commit":"npx lint-staged"}}"#,
        );
        let manifest = PackageManifest::load(&fs, root()).unwrap();
        assert_eq!(
            active_hook_manager(&fs, root(), manifest.as_ref()),
            Some(ToolId::SimpleGitHooks)
        );

        assert_eq!(active_hook_manager(&MockFileSystemOps::new(), root(), None), None);
    }

    #[test]
    fn probes_collect_in_one_pass() {
        let fs = MockFileSystemOps::new()
            .with_dir("/p")
            .with_file("/p/tsconfig.json", "{}")
            .with_file("/p/main.css", "");
        let probes = ProjectProbes::collect(&fs, root()).unwrap();
        assert!(probes.typescript);
        assert!(probes.stylesheets);
        assert_eq!(probes.hook_manager, None);
    }
}
