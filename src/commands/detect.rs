//! Command: list detected configuration without changing anything.
use anyhow::Result;

use super::CommandSetup;
use crate::cli::GlobalOpts;
use crate::config::PackageManifest;
use crate::logging::Log;
use crate::migration::cleanup::superseded_dependencies;
use crate::migration::detect::detect;
use crate::migration::{ProjectProbes, ToolInventory};
use crate::operations::{FileSystemOps, SystemFileSystemOps};
use crate::resources::helpers::fs::display_relative;

/// Run the detect command.
///
/// # Errors
///
/// Returns an error if setup fails or `package.json` cannot be parsed.
pub fn run(global: &GlobalOpts, log: &dyn Log) -> Result<()> {
    let fs = SystemFileSystemOps;
    let setup = CommandSetup::init(global, &fs, log)?;
    describe(&fs, &setup, log)
}

/// Log the inventory, probes and superseded packages for the project.
///
/// # Errors
///
/// Returns an error if `package.json` cannot be parsed.
pub fn describe(fs: &dyn FileSystemOps, setup: &CommandSetup, log: &dyn Log) -> Result<()> {
    let root = &setup.root;
    let inventory = detect(fs, root)?;
    let probes = ProjectProbes::collect(fs, root)?;

    log.stage("Configuration");
    log_inventory(&inventory, root, log);

    log.stage("Project");
    log.info(&format!("package manager: {}", setup.profile.id));
    log.info(&format!("typescript: {}", yes_no(probes.typescript)));
    log.info(&format!("stylesheets: {}", yes_no(probes.stylesheets)));
    log.info(&format!(
        "git hooks: {}",
        probes.hook_manager.map_or("none", |m| m.name())
    ));

    let keep = &setup.settings.keep;
    if let Some(manifest) = PackageManifest::load(fs, root)? {
        let superseded = superseded_dependencies(&manifest, keep);
        log.stage("Superseded packages");
        if superseded.is_empty() {
            log.info("none");
        }
        for name in superseded {
            log.info(&name);
        }
    }
    Ok(())
}

fn log_inventory(inventory: &ToolInventory, root: &std::path::Path, log: &dyn Log) {
    if !inventory.has_configs {
        log.info("no existing configuration found");
        return;
    }
    for tool in &inventory.tools {
        log.info(&format!("{}:", tool.name()));
        for config in inventory.configs_for(*tool) {
            let location = display_relative(root, &config.path);
            match &config.field {
                Some(field) => log.info(&format!("  {location} ({field})")),
                None => log.info(&format!("  {location}")),
            }
        }
    }
}

const fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::logging::RecordingLog;
    use crate::operations::MockFileSystemOps;
    use crate::resources::PackageManager;
    use std::path::PathBuf;

    fn setup() -> CommandSetup {
        CommandSetup {
            root: PathBuf::from("/p"),
            settings: Settings::default(),
            profile: PackageManager::Yarn.profile(),
        }
    }

    #[test]
    fn lists_tools_probes_and_packages() {
        let fs = MockFileSystemOps::new()
            .with_dir("/p")
            .with_dir("/p/.husky")
            .with_file("/p/.husky/pre-commit", "npx lint-staged\n")
            .with_file(
                "/p/package.json",
                r#"{"prettier":{},"devDependencies":{"prettier":"^3","eslint-config-next":"15"}}"#,
            );
        let log = RecordingLog::default();

        describe(&fs, &setup(), &log).unwrap();

        let info = log.messages("info");
        assert!(info.contains(&"  package.json (prettier)".to_string()));
        assert!(info.contains(&"  .husky/pre-commit".to_string()));
        assert!(info.contains(&"package manager: yarn".to_string()));
        assert!(info.contains(&"git hooks: Husky".to_string()));
        assert!(info.contains(&"prettier".to_string()));
        assert!(!info.contains(&"eslint-config-next".to_string()));
    }

    #[test]
    fn empty_project_says_so() {
        let fs = MockFileSystemOps::new().with_dir("/p");
        let log = RecordingLog::default();

        describe(&fs, &setup(), &log).unwrap();

        assert!(
            log.messages("info")
                .contains(&"no existing configuration found".to_string())
        );
    }
}
