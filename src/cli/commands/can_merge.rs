//! cli::commands::can_merge
//!
//! Decide whether a user may merge the checked-out branch.
//!
//! The command succeeds when the user is authorized and fails with
//! [`NotAuthorized`] otherwise, so scripts can rely on the exit status.

use anyhow::{Context as _, Result};
use thiserror::Error;

use super::{extra_series, forge_for, load_config, lock_clone, open_repo, Context};
use crate::addons::authorize::{authorize, Decision};

/// The user may not merge.
#[derive(Debug, Error)]
#[error("{user} may not merge into {target}: {decision}")]
pub struct NotAuthorized {
    pub user: String,
    pub target: String,
    pub decision: Decision,
}

/// Run the can-merge command.
///
/// This is a synchronous wrapper that uses tokio to run the async implementation.
pub fn can_merge(ctx: &Context, user: &str, target: &str) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(can_merge_async(ctx, user, target))
}

async fn can_merge_async(ctx: &Context, user: &str, target: &str) -> Result<()> {
    let git = open_repo(ctx)?;
    let config = load_config(&git)?;
    let extra = extra_series(&config)?;
    let forge = forge_for(&config, &git)?;

    let _lock = lock_clone(&git)?;
    let decision = authorize(forge.as_ref(), &git, user, target, &extra)
        .await
        .context("Failed to decide authorization")?;

    if !decision.is_authorized() {
        return Err(NotAuthorized {
            user: user.to_string(),
            target: target.to_string(),
            decision,
        }
        .into());
    }

    if !ctx.quiet {
        println!("{} may merge into {}: {}", user, target, decision);
    }
    Ok(())
}
