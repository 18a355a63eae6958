//! Reconciling generated configuration fragments with hand-maintained JSON
//! documents.
//!
//! [`deep_merge`] is the general operation. The file-level helpers layer the
//! policies each document needs on top of it: editor settings always
//! deduplicate arrays, script maps never clobber an existing script unless
//! asked to, and field removal is a no-op on a missing document.
//!
//! A key missing from the source is "absent" and never touches the target; a
//! source `null` is a real value and replaces whatever the target held.
use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{MigrationError, Result};
use crate::operations::FileSystemOps;
use crate::resources::helpers::json::{read_json, write_json};

/// How two documents are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Union keys, recurse into objects, source wins scalar conflicts.
    #[default]
    Deep,
    /// Source replaces target outright.
    Replace,
    /// Target is kept unchanged; the merge is recorded as skipped.
    Preserve,
}

/// How conflicting arrays are combined under [`MergeStrategy::Deep`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArrayPolicy {
    /// Target elements followed by source elements.
    #[default]
    Concat,
    /// Source array wins.
    Replace,
    /// Target elements in order, then source elements not already present.
    Unique,
}

/// How [`deep_merge`] combines two documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOptions {
    /// Object handling.
    pub strategy: MergeStrategy,
    /// Array handling.
    pub arrays: ArrayPolicy,
}

impl MergeOptions {
    /// Deep merge with set-like arrays.
    pub const UNIQUE: Self = Self {
        strategy: MergeStrategy::Deep,
        arrays: ArrayPolicy::Unique,
    };
}

/// Output of [`deep_merge`].
#[derive(Debug, Clone, PartialEq)]
pub struct MergeResult {
    /// Merged document.
    pub value: Value,
    /// The strategy declined to merge ([`MergeStrategy::Preserve`]).
    pub skipped: bool,
}

/// Merge `source` into a copy of `target`.
#[must_use]
pub fn deep_merge(target: &Value, source: &Value, opts: MergeOptions) -> MergeResult {
    match opts.strategy {
        MergeStrategy::Preserve => MergeResult {
            value: target.clone(),
            skipped: true,
        },
        MergeStrategy::Replace => MergeResult {
            value: source.clone(),
            skipped: false,
        },
        MergeStrategy::Deep => {
            let mut value = target.clone();
            merge_into(&mut value, source, opts.arrays);
            MergeResult {
                value,
                skipped: false,
            }
        }
    }
}

fn merge_into(target: &mut Value, source: &Value, arrays: ArrayPolicy) {
    match (target, source) {
        (Value::Object(target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                match target_map.get_mut(key) {
                    Some(target_val) if !source_val.is_null() => {
                        merge_into(target_val, source_val, arrays);
                    }
                    _ => {
                        target_map.insert(key.clone(), source_val.clone());
                    }
                }
            }
        }
        (Value::Array(target_items), Value::Array(source_items)) => match arrays {
            ArrayPolicy::Concat => target_items.extend(source_items.iter().cloned()),
            ArrayPolicy::Replace => target_items.clone_from(source_items),
            ArrayPolicy::Unique => {
                for item in source_items {
                    if !target_items.contains(item) {
                        target_items.push(item.clone());
                    }
                }
            }
        },
        (target, source) => {
            *target = source.clone();
        }
    }
}

fn read_object(fs: &dyn FileSystemOps, path: &Path) -> Result<Option<Map<String, Value>>> {
    match read_json(fs, path)? {
        None => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(MigrationError::validation(format!(
            "{} must contain a JSON object",
            path.display()
        ))),
    }
}

/// Merge `fragment` into the settings document at `path` (created when
/// missing), deduplicating arrays so repeated runs converge.
///
/// Returns `true` if the document changed (or would change, in a dry run).
///
/// # Errors
///
/// Returns [`MigrationError::Validation`] if the existing document is not a
/// JSON object, and [`MigrationError::Internal`] on I/O failure.
pub fn merge_settings_file(
    fs: &dyn FileSystemOps,
    path: &Path,
    fragment: &Value,
    dry_run: bool,
) -> Result<bool> {
    let current = Value::Object(read_object(fs, path)?.unwrap_or_default());
    let merged = deep_merge(&current, fragment, MergeOptions::UNIQUE).value;
    let changed = merged != current || !fs.is_file(path);
    if changed && !dry_run {
        write_json(fs, path, &merged)?;
    }
    Ok(changed)
}

/// Fragment of `.vscode/extensions.json`; `None` fields are absent and leave
/// the document's list alone.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExtensionsFragment {
    #[serde(skip_serializing_if = "Option::is_none")]
    recommendations: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    unwanted_recommendations: Option<Vec<String>>,
}

fn non_empty(items: &[String]) -> Option<Vec<String>> {
    (!items.is_empty()).then(|| items.to_vec())
}

fn retain_strings(doc: &mut Map<String, Value>, key: &str, drop: &[String]) {
    if let Some(Value::Array(items)) = doc.get_mut(key) {
        items.retain(|v| v.as_str().is_none_or(|s| !drop.iter().any(|d| d == s)));
    }
}

/// Add `recommend` to the extension recommendations at `path` and move
/// `unwanted` from `recommendations` to `unwantedRecommendations`.
///
/// Returns `true` if the document changed (or would change, in a dry run).
///
/// # Errors
///
/// Returns [`MigrationError::Validation`] if the existing document is not a
/// JSON object, and [`MigrationError::Internal`] on I/O failure.
pub fn merge_extension_recommendations(
    fs: &dyn FileSystemOps,
    path: &Path,
    recommend: &[String],
    unwanted: &[String],
    dry_run: bool,
) -> Result<bool> {
    let original = read_object(fs, path)?;
    let mut doc = original.clone().unwrap_or_default();
    retain_strings(&mut doc, "recommendations", unwanted);
    retain_strings(&mut doc, "unwantedRecommendations", recommend);

    let fragment = ExtensionsFragment {
        recommendations: non_empty(recommend),
        unwanted_recommendations: non_empty(unwanted),
    };
    let fragment = serde_json::to_value(fragment)?;
    let merged = deep_merge(&Value::Object(doc), &fragment, MergeOptions::UNIQUE).value;

    let changed = original.map(Value::Object).as_ref() != Some(&merged);
    if changed && !dry_run {
        write_json(fs, path, &merged)?;
    }
    Ok(changed)
}

/// What [`merge_scripts`] did to each script name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptMerge {
    /// Scripts that did not exist before.
    pub added: Vec<String>,
    /// Existing scripts that were overwritten.
    pub replaced: Vec<String>,
    /// Existing scripts left alone because overwriting was not requested.
    pub kept: Vec<String>,
}

impl ScriptMerge {
    /// Whether the manifest needs rewriting.
    #[must_use]
    pub fn changed(&self) -> bool {
        !self.added.is_empty() || !self.replaced.is_empty()
    }
}

/// Merge a script map into the `scripts` of the manifest at `manifest_path`.
///
/// An existing script with a different command is only replaced when
/// `overwrite` is set.
///
/// # Errors
///
/// Returns [`MigrationError::NotFound`] if the manifest does not exist,
/// [`MigrationError::Validation`] if `scripts` or the manifest's `scripts`
/// is not an object, and [`MigrationError::Internal`] on I/O failure.
pub fn merge_scripts(
    fs: &dyn FileSystemOps,
    manifest_path: &Path,
    scripts: &Value,
    overwrite: bool,
    dry_run: bool,
) -> Result<ScriptMerge> {
    let Value::Object(incoming) = scripts else {
        return Err(MigrationError::validation("scripts must be a map of names to commands"));
    };
    let mut doc = read_object(fs, manifest_path)?.ok_or_else(|| MigrationError::NotFound {
        path: manifest_path.to_path_buf(),
    })?;

    let existing = doc
        .entry("scripts")
        .or_insert_with(|| Value::Object(Map::new()));
    let Value::Object(existing) = existing else {
        return Err(MigrationError::validation(format!(
            "\"scripts\" in {} must be an object",
            manifest_path.display()
        )));
    };

    let mut outcome = ScriptMerge::default();
    for (name, command) in incoming {
        match existing.get(name) {
            None => {
                existing.insert(name.clone(), command.clone());
                outcome.added.push(name.clone());
            }
            Some(current) if current == command => {}
            Some(_) if overwrite => {
                existing.insert(name.clone(), command.clone());
                outcome.replaced.push(name.clone());
            }
            Some(_) => outcome.kept.push(name.clone()),
        }
    }

    if outcome.changed() && !dry_run {
        write_json(fs, manifest_path, &Value::Object(doc))?;
    }
    Ok(outcome)
}

/// Strip top-level `keys` from the document at `path`.
///
/// Returns the keys that were present. A missing document is a no-op, and
/// the file is only rewritten when something was removed.
///
/// # Errors
///
/// Returns [`MigrationError::Validation`] if the document is not a JSON
/// object, and [`MigrationError::Internal`] on I/O failure.
pub fn remove_fields(
    fs: &dyn FileSystemOps,
    path: &Path,
    keys: &[String],
    dry_run: bool,
) -> Result<Vec<String>> {
    let Some(mut doc) = read_object(fs, path)? else {
        return Ok(Vec::new());
    };
    let removed: Vec<String> = keys
        .iter()
        .filter(|k| doc.shift_remove(k.as_str()).is_some())
        .cloned()
        .collect();
    if !removed.is_empty() && !dry_run {
        write_json(fs, path, &Value::Object(doc))?;
    }
    Ok(removed)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::operations::MockFileSystemOps;
    use serde_json::json;

    fn merge(target: Value, source: Value, arrays: ArrayPolicy) -> Value {
        deep_merge(
            &target,
            &source,
            MergeOptions {
                strategy: MergeStrategy::Deep,
                arrays,
            },
        )
        .value
    }

    #[test]
    fn union_of_keys_with_source_winning_scalars() {
        let merged = deep_merge(
            &json!({"a": 1, "b": 2}),
            &json!({"b": 3, "c": 4}),
            MergeOptions::default(),
        );
        assert_eq!(merged.value, json!({"a": 1, "b": 3, "c": 4}));
        assert!(!merged.skipped);
    }

    #[test]
    fn nested_objects_recurse() {
        let merged = merge(
            json!({"editor": {"tabSize": 2, "rulers": [80]}}),
            json!({"editor": {"formatOnSave": true}}),
            ArrayPolicy::Concat,
        );
        assert_eq!(
            merged,
            json!({"editor": {"tabSize": 2, "rulers": [80], "formatOnSave": true}})
        );
    }

    #[test]
    fn array_policies() {
        let target = json!({"items": [1, 2, 3]});
        let source = json!({"items": [2, 3, 4]});
        assert_eq!(
            merge(target.clone(), source.clone(), ArrayPolicy::Concat),
            json!({"items": [1, 2, 3, 2, 3, 4]})
        );
        assert_eq!(
            merge(target.clone(), source.clone(), ArrayPolicy::Replace),
            json!({"items": [2, 3, 4]})
        );
        assert_eq!(
            merge(target, source, ArrayPolicy::Unique),
            json!({"items": [1, 2, 3, 4]})
        );
    }

    #[test]
    fn unique_is_idempotent() {
        let once = merge(
            json!({"items": [1, 2, 3]}),
            json!({"items": [2, 3, 4]}),
            ArrayPolicy::Unique,
        );
        let twice = merge(once.clone(), once.clone(), ArrayPolicy::Unique);
        assert_eq!(twice, once);
    }

    #[test]
    fn null_overrides_nested_object_but_absent_does_not() {
        let target = json!({"lint": {"rules": {"semi": "error"}}, "keep": {"x": 1}});
        let merged = merge(target, json!({"lint": null}), ArrayPolicy::Concat);
        assert_eq!(merged, json!({"lint": null, "keep": {"x": 1}}));
    }

    #[test]
    fn replace_and_preserve_strategies() {
        let target = json!({"a": 1});
        let source = json!({"b": 2});
        let replaced = deep_merge(
            &target,
            &source,
            MergeOptions {
                strategy: MergeStrategy::Replace,
                ..MergeOptions::default()
            },
        );
        assert_eq!(replaced.value, source);

        let preserved = deep_merge(
            &target,
            &source,
            MergeOptions {
                strategy: MergeStrategy::Preserve,
                ..MergeOptions::default()
            },
        );
        assert_eq!(preserved.value, target);
        assert!(preserved.skipped);
    }

    #[test]
    fn settings_file_merge_converges() {
        let fs = MockFileSystemOps::new().with_file(
            "/p/.vscode/settings.json",
            r#"{"files.exclude": {"dist": true}, "cSpell.words": ["biome"]}"#,
        );
        let path = Path::new("/p/.vscode/settings.json");
        let fragment = json!({"editor.formatOnSave": true, "cSpell.words": ["biome", "lefthook"]});

        assert!(merge_settings_file(&fs, path, &fragment, false).unwrap());
        assert!(!merge_settings_file(&fs, path, &fragment, false).unwrap());

        let doc: Value = serde_json::from_str(&fs.contents(path).unwrap()).unwrap();
        assert_eq!(doc["cSpell.words"], json!(["biome", "lefthook"]));
        assert_eq!(doc["files.exclude"], json!({"dist": true}));
    }

    #[test]
    fn settings_file_dry_run_writes_nothing() {
        let fs = MockFileSystemOps::new();
        let path = Path::new("/p/.vscode/settings.json");
        assert!(merge_settings_file(&fs, path, &json!({"a": 1}), true).unwrap());
        assert!(fs.writes().is_empty());
    }

    #[test]
    fn extensions_move_superseded_to_unwanted() {
        let fs = MockFileSystemOps::new().with_file(
            "/p/.vscode/extensions.json",
            r#"{"recommendations": ["esbenp.prettier-vscode", "eamodio.gitlens"], "unwantedRecommendations": ["biomejs.biome"]}"#,
        );
        let path = Path::new("/p/.vscode/extensions.json");
        let recommend = vec!["biomejs.biome".to_string()];
        let unwanted = vec!["esbenp.prettier-vscode".to_string()];

        assert!(merge_extension_recommendations(&fs, path, &recommend, &unwanted, false).unwrap());

        let doc: Value = serde_json::from_str(&fs.contents(path).unwrap()).unwrap();
        assert_eq!(
            doc["recommendations"],
            json!(["eamodio.gitlens", "biomejs.biome"])
        );
        assert_eq!(doc["unwantedRecommendations"], json!(["esbenp.prettier-vscode"]));
        assert!(!merge_extension_recommendations(&fs, path, &recommend, &unwanted, false).unwrap());
    }

    #[test]
    fn scripts_are_not_overwritten_without_flag() {
        let fs = MockFileSystemOps::new().with_file(
            "/p/package.json",
            r#"{"scripts": {"lint": "eslint . --max-warnings 0", "test": "vitest"}}"#,
        );
        let path = Path::new("/p/package.json");
        let scripts = json!({"lint": "biome lint .", "format": "biome format --write ."});

        let outcome = merge_scripts(&fs, path, &scripts, false, false).unwrap();
        assert_eq!(outcome.added, vec!["format"]);
        assert_eq!(outcome.kept, vec!["lint"]);
        let doc: Value = serde_json::from_str(&fs.contents(path).unwrap()).unwrap();
        assert_eq!(doc["scripts"]["lint"], json!("eslint . --max-warnings 0"));
        assert_eq!(doc["scripts"]["test"], json!("vitest"));

        let outcome = merge_scripts(&fs, path, &scripts, true, false).unwrap();
        assert_eq!(outcome.replaced, vec!["lint"]);
        let doc: Value = serde_json::from_str(&fs.contents(path).unwrap()).unwrap();
        assert_eq!(doc["scripts"]["lint"], json!("biome lint ."));
    }

    #[test]
    fn scripts_require_a_manifest() {
        let fs = MockFileSystemOps::new();
        let err = merge_scripts(&fs, Path::new("/p/package.json"), &json!({}), false, false)
            .unwrap_err();
        assert!(matches!(err, MigrationError::NotFound { .. }));
    }

    #[test]
    fn remove_fields_strips_present_keys_only() {
        let fs = MockFileSystemOps::new().with_file(
            "/p/package.json",
            r#"{"name": "demo", "prettier": {}, "eslintConfig": {}}"#,
        );
        let path = Path::new("/p/package.json");
        let keys = vec!["prettier".to_string(), "stylelint".to_string()];

        assert_eq!(remove_fields(&fs, path, &keys, false).unwrap(), vec!["prettier"]);
        let doc: Value = serde_json::from_str(&fs.contents(path).unwrap()).unwrap();
        assert_eq!(doc, json!({"name": "demo", "eslintConfig": {}}));
    }

    #[test]
    fn remove_fields_on_missing_document_is_noop() {
        let fs = MockFileSystemOps::new();
        let removed =
            remove_fields(&fs, Path::new("/p/package.json"), &["prettier".to_string()], false)
                .unwrap();
        assert!(removed.is_empty());
        assert!(fs.writes().is_empty());
    }
}
