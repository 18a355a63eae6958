//! Package-manager profiles and lock-file driven resolution.
use std::fmt;
use std::path::Path;

use crate::operations::FileSystemOps;

/// Supported JavaScript package managers, in resolution precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageManager {
    /// Bun.
    Bun,
    /// pnpm.
    Pnpm,
    /// Yarn.
    Yarn,
    /// npm, also the fallback.
    Npm,
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.profile().id)
    }
}

/// Command templates for one package-manager ecosystem.
///
/// Each command is an argv prefix: the first element is the program, the
/// rest are leading arguments; package names are appended.
#[derive(Debug, PartialEq, Eq)]
pub struct PackageManagerProfile {
    /// Manager the profile drives.
    pub manager: PackageManager,
    /// Name used on the command line and in reports.
    pub id: &'static str,
    /// Lock files that select this profile; the first is the one it writes.
    pub lock_files: &'static [&'static str],
    /// Install the lock-file dependency set.
    pub install: &'static [&'static str],
    /// Add command without a dev flag.
    pub add: &'static [&'static str],
    /// Flag marking added packages as dev dependencies.
    pub dev_flag: &'static str,
    /// Remove packages.
    pub remove: &'static [&'static str],
    /// One-off package execution prefix (`npx`, `pnpm dlx`, ...).
    pub dlx: &'static [&'static str],
    /// Flag that makes `install` refuse to touch the lock file.
    pub ci_flag: Option<&'static str>,
}

static BUN: PackageManagerProfile = PackageManagerProfile {
    manager: PackageManager::Bun,
    id: "bun",
    lock_files: &["bun.lock", "bun.lockb"],
    install: &["bun", "install"],
    add: &["bun", "add"],
    dev_flag: "--dev",
    remove: &["bun", "remove"],
    dlx: &["bunx"],
    ci_flag: Some("--frozen-lockfile"),
};

static PNPM: PackageManagerProfile = PackageManagerProfile {
    manager: PackageManager::Pnpm,
    id: "pnpm",
    lock_files: &["pnpm-lock.yaml"],
    install: &["pnpm", "install"],
    add: &["pnpm", "add"],
    dev_flag: "-D",
    remove: &["pnpm", "remove"],
    dlx: &["pnpm", "dlx"],
    ci_flag: Some("--frozen-lockfile"),
};

static YARN: PackageManagerProfile = PackageManagerProfile {
    manager: PackageManager::Yarn,
    id: "yarn",
    lock_files: &["yarn.lock"],
    install: &["yarn", "install"],
    add: &["yarn", "add"],
    dev_flag: "-D",
    remove: &["yarn", "remove"],
    dlx: &["yarn", "dlx"],
    ci_flag: Some("--frozen-lockfile"),
};

static NPM: PackageManagerProfile = PackageManagerProfile {
    manager: PackageManager::Npm,
    id: "npm",
    lock_files: &["package-lock.json"],
    install: &["npm", "install"],
    add: &["npm", "install"],
    dev_flag: "--save-dev",
    remove: &["npm", "uninstall"],
    dlx: &["npx"],
    ci_flag: None,
};

/// Every profile, in precedence order: when several lock files coexist the
/// fastest, most modern tooling wins.
pub static PROFILES: &[&PackageManagerProfile] = &[&BUN, &PNPM, &YARN, &NPM];

/// Profile used when a project has no lock file at all.
pub const DEFAULT_MANAGER: PackageManager = PackageManager::Npm;

impl PackageManager {
    /// This manager's command templates.
    #[must_use]
    pub fn profile(self) -> &'static PackageManagerProfile {
        match self {
            Self::Bun => &BUN,
            Self::Pnpm => &PNPM,
            Self::Yarn => &YARN,
            Self::Npm => &NPM,
        }
    }
}

/// Pick the profile for the project at `root` from its lock files.
///
/// Pure and deterministic: only existence checks are performed, and
/// [`PROFILES`] order decides when several lock files are present.
#[must_use]
pub fn resolve(fs: &dyn FileSystemOps, root: &Path) -> &'static PackageManagerProfile {
    PROFILES
        .iter()
        .find(|p| p.lock_files.iter().any(|f| fs.is_file(&root.join(f))))
        .copied()
        .unwrap_or_else(|| DEFAULT_MANAGER.profile())
}

fn command(prefix: &[&str], extra: &[&str], packages: &[String]) -> Vec<String> {
    prefix
        .iter()
        .chain(extra)
        .map(ToString::to_string)
        .chain(packages.iter().cloned())
        .collect()
}

impl PackageManagerProfile {
    /// `install`, optionally with the frozen-lockfile flag.
    ///
    /// npm has no flag for this; its CI-safe install is the `ci` subcommand.
    #[must_use]
    pub fn install_command(&self, frozen: bool) -> Vec<String> {
        match (frozen, self.ci_flag) {
            (true, Some(flag)) => command(self.install, &[flag], &[]),
            (true, None) => command(&[self.program(), "ci"], &[], &[]),
            (false, _) => command(self.install, &[], &[]),
        }
    }

    /// Add `packages`, as dev dependencies when `dev` is set.
    #[must_use]
    pub fn add_command(&self, packages: &[String], dev: bool) -> Vec<String> {
        let flag: &[&str] = if dev { &[self.dev_flag] } else { &[] };
        command(self.add, flag, packages)
    }

    /// Remove `packages`.
    #[must_use]
    pub fn remove_command(&self, packages: &[String]) -> Vec<String> {
        command(self.remove, &[], packages)
    }

    /// Run a package binary without installing it.
    #[must_use]
    pub fn dlx_command(&self, argv: &[String]) -> Vec<String> {
        command(self.dlx, &[], argv)
    }

    /// The executable every command of this profile starts with.
    #[must_use]
    pub fn program(&self) -> &'static str {
        self.install.first().copied().unwrap_or(self.id)
    }
}
