//! Configuration-migration engine.
//!
//! Moves a JavaScript/TypeScript project from one developer-tooling stack
//! (formatter, linter, style linter, git-hook manager) to another without
//! losing anything: existing configuration is inventoried and backed up
//! before it is removed, the replacement tooling is installed through the
//! project's own package manager, and every step lands in a Markdown report.
//!
//! The public API is organised into layers:
//!
//! - **[`config`]** : tool signatures, `package.json` access and `configshift.toml` settings
//! - **[`resources`]** : package-manager profiles, the batched installer, git config
//! - **[`migration`]** : detection, backup, cleanup, merge and reporting
//! - **[`tasks`]** : named pipeline steps wired to the migration engine
//! - **[`commands`]** : top-level subcommand orchestration (`migrate`, `detect`, `clean`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod migration;
pub mod operations;
pub mod resources;
pub mod tasks;
