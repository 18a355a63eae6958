//! Command-line interface definitions.
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI entry point for the configuration-migration engine.
#[derive(Parser, Debug)]
#[command(
    name = "configshift",
    about = "Safe, reversible migration of a project's developer-tooling configuration",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Project root (defaults to the current directory)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Settings file (defaults to <root>/configshift.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Turn individual failures into warnings and keep going
    #[arg(long, global = true)]
    pub force: bool,

    /// Only print warnings and errors
    #[arg(long, global = true)]
    pub silent: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Back up, remove and replace the project's tooling configuration
    Migrate(MigrateOpts),
    /// List detected configuration and project characteristics
    Detect,
    /// Remove one tool's configuration files and manifest keys
    Clean(CleanOpts),
    /// Print version information
    Version,
}

impl Command {
    /// Subcommand name, used to name the log file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Migrate(_) => "migrate",
            Self::Detect => "detect",
            Self::Clean(_) => "clean",
            Self::Version => "version",
        }
    }
}

/// Options for the `migrate` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct MigrateOpts {
    /// Do not ask for confirmation before removing anything
    #[arg(short, long)]
    pub yes: bool,

    /// Remove configuration without writing a backup first
    #[arg(long)]
    pub skip_backup: bool,

    /// Packages to keep even though they are superseded
    #[arg(long, value_delimiter = ',')]
    pub keep: Vec<String>,

    /// Replace existing package.json scripts with the new ones
    #[arg(long)]
    pub overwrite_scripts: bool,

    /// Skip specific tasks
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,
}

/// Options for the `clean` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct CleanOpts {
    /// Tool id (prettier, eslint, stylelint, markdownlint, husky, lefthook,
    /// simple-git-hooks, lint-staged)
    pub tool: String,

    /// Do not ask for confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Remove configuration without writing a backup first
    #[arg(long)]
    pub skip_backup: bool,
}
