//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Only log warnings and errors
//! - `--json-logs`: Emit logs as JSON lines

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::core::version::BumpMode;

/// Steward - addon scoping, maintainer and version tooling for addon repositories
#[derive(Parser, Debug)]
#[command(name = "steward")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if steward was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the addons the checked-out branch modifies
    #[command(
        name = "changed",
        long_about = "List the addons the checked-out branch modifies.\n\n\
            The merge of the checked-out branch into the target is simulated on a \
            scratch branch, so changes that only exist on the target are not \
            reported. Files outside any addon are reported as other changes.",
        after_help = "\
EXAMPLES:
    # Addons a feature branch touches, compared to 16.0
    steward changed --target 16.0

    # Machine-readable output
    steward changed --target origin/16.0 --json"
    )]
    Changed {
        /// Branch or revision the change would be merged into
        #[arg(long)]
        target: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show the maintainers of addons, unioned across branches
    #[command(
        name = "maintainers",
        after_help = "\
EXAMPLES:
    # Maintainers on the checked-out branch
    steward maintainers web_widget base_tier

    # Maintainers declared on either release line
    steward maintainers web_widget --branch 15.0 --branch 16.0"
    )]
    Maintainers {
        /// Addon directories, relative to the repository root
        #[arg(required = true)]
        addons: Vec<PathBuf>,

        /// Branch to read declarations from (repeatable; default: checked-out branch)
        #[arg(long = "branch")]
        branches: Vec<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Decide whether a user may merge the checked-out branch
    #[command(
        name = "can-merge",
        long_about = "Decide whether a user may merge the checked-out branch.\n\n\
            Users with push rights on the forge always may. Other users may when the \
            change touches only addons and they are declared maintainers of all of \
            them, on the target branch or on a branch listed in \
            maintainer_check_series.\n\n\
            Exits with status 0 when authorized and 1 otherwise.",
        after_help = "\
EXAMPLES:
    steward can-merge --user octocat --target 16.0"
    )]
    CanMerge {
        /// Forge login to check
        #[arg(long)]
        user: String,

        /// Branch the change would be merged into
        #[arg(long)]
        target: String,
    },

    /// Bump the version declared in an addon descriptor
    #[command(
        name = "bump",
        after_help = "\
EXAMPLES:
    # 16.0.1.2.3 -> 16.0.1.3.0
    steward bump web_widget minor

    # Also commit the descriptor as \"[BOT] web_widget 16.0.2.0.0\"
    steward bump web_widget major --commit"
    )]
    Bump {
        /// Addon directory
        addon: PathBuf,

        /// Which component to increment
        mode: BumpMode,

        /// Commit the descriptor change
        #[arg(long)]
        commit: bool,
    },

    /// Print the release series of a version or branch name
    #[command(name = "series")]
    Series {
        /// Version like 16.0.1.0.0, or branch name with --branch
        value: String,

        /// Interpret the value as a branch name (must be exactly like 16.0)
        #[arg(long)]
        branch: bool,
    },

    /// Mention the maintainers of addons a pull request modifies
    #[command(
        name = "mention",
        long_about = "Mention the maintainers of addons a pull request modifies.\n\n\
            The pull request head must be checked out. Maintainers are read on the \
            pull request's base branch and on maintainer_check_series. Nothing is \
            posted when the opener maintains one of the addons.",
        after_help = "\
EXAMPLES:
    # Show what would be posted without posting it
    steward mention --pr 42 --dry-run"
    )]
    Mention {
        /// Pull request number
        #[arg(long)]
        pr: u64,

        /// Print the comment instead of posting it
        #[arg(long)]
        dry_run: bool,
    },
}
