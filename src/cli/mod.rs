//! cli
//!
//! Command-line interface layer for steward.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Initialise logging
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to
//! [`commands`], which call into [`crate::addons`] and render the result.

pub mod args;
pub mod commands;

pub use args::Cli;

use crate::telemetry;
use anyhow::Result;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    telemetry::init_tracing(cli.json_logs, telemetry::level_for(cli.debug, cli.quiet));

    let ctx = commands::Context {
        cwd: cli.cwd.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
    };

    commands::dispatch(cli.command, &ctx)
}
