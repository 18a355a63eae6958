//! `configshift` binary entry point.
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use configshift::{cli, commands, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();
    let name = args.command.name();
    let header = logging::RunHeader {
        command: name.to_string(),
        root: args
            .global
            .root
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_default(),
        dry_run: args.global.dry_run,
        force: args.global.force,
    };
    logging::init_subscriber(
        &header,
        logging::Verbosity::from_flags(args.verbose, args.global.silent),
    );
    let log = Arc::new(logging::Logger::new(name));

    match &args.command {
        cli::Command::Migrate(opts) => commands::migrate::run(&args.global, opts, &log),
        cli::Command::Detect => commands::detect::run(&args.global, log.as_ref()),
        cli::Command::Clean(opts) => commands::clean::run(&args.global, opts, &log),
        cli::Command::Version => {
            commands::version::run();
            Ok(())
        }
    }
}
