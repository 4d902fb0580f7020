//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Opens the repository and loads configuration
//! 2. Takes the clone lock when it is going to move HEAD
//! 3. Calls into [`crate::addons`]
//! 4. Formats and displays output
//!
//! # Async Commands
//!
//! Commands that talk to the forge (`can-merge`, `mention`) are async
//! because they involve network I/O. Their sync wrappers run them on a
//! fresh tokio runtime.

mod bump;
mod can_merge;
mod changed;
mod maintainers;
mod mention;
mod series;

pub use bump::bump;
pub use can_merge::{can_merge, NotAuthorized};
pub use changed::changed;
pub use maintainers::maintainers;
pub use mention::mention;
pub use series::series;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use tracing::warn;

use crate::cli::args::Command;
use crate::core::config::Config;
use crate::core::ops::lock::CloneLock;
use crate::core::types::BranchName;
use crate::forge::{create_forge, Forge};
use crate::git::Git;

/// Settings shared by every command.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Directory to run in (default: process working directory)
    pub cwd: Option<PathBuf>,
    pub debug: bool,
    pub quiet: bool,
}

impl Context {
    fn cwd(&self) -> Result<PathBuf> {
        match &self.cwd {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir().context("Failed to get current directory"),
        }
    }
}

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Changed { target, json } => changed::changed(ctx, &target, json),
        Command::Maintainers {
            addons,
            branches,
            json,
        } => maintainers::maintainers(ctx, &addons, &branches, json),
        Command::CanMerge { user, target } => can_merge::can_merge(ctx, &user, &target),
        Command::Bump {
            addon,
            mode,
            commit,
        } => bump::bump(ctx, &addon, mode, commit),
        Command::Series { value, branch } => series::series(&value, branch),
        Command::Mention { pr, dry_run } => mention::mention(ctx, pr, dry_run),
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn open_repo(ctx: &Context) -> Result<Git> {
    let cwd = ctx.cwd()?;
    Git::open(&cwd).with_context(|| format!("Failed to open repository at {}", cwd.display()))
}

fn load_config(git: &Git) -> Result<Config> {
    let work_dir = git.work_dir()?;
    let result = Config::load(Some(work_dir)).context("Failed to load configuration")?;
    for warning in &result.warnings {
        warn!(path = %warning.path.display(), "{}", warning.message);
    }
    Ok(result.config)
}

/// Extra maintainer-check branches from configuration.
fn extra_series(config: &Config) -> Result<Vec<BranchName>> {
    config
        .maintainer_check_series()
        .iter()
        .map(|b| BranchName::new(b.as_str()).with_context(|| format!("Invalid series branch '{}'", b)))
        .collect()
}

fn lock_clone(git: &Git) -> Result<CloneLock> {
    CloneLock::acquire(git.git_dir()).context("Another steward operation is using this clone")
}

fn forge_for(config: &Config, git: &Git) -> Result<Box<dyn Forge>> {
    let token_env = config.token_env();
    let token = std::env::var(token_env)
        .with_context(|| format!("No forge token: set the {} environment variable", token_env))?;
    let remote = git.remote_url("origin")?;
    create_forge(config, &token, remote.as_deref()).context("Failed to create forge")
}
