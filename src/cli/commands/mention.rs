//! cli::commands::mention
//!
//! Mention the maintainers of addons a pull request modifies.

use anyhow::{Context as _, Result};

use super::{extra_series, forge_for, load_config, lock_clone, open_repo, Context};
use crate::addons::mention::mention_maintainers;
use crate::forge::mock::MockForge;
use crate::forge::Forge;

/// Run the mention command.
///
/// This is a synchronous wrapper that uses tokio to run the async implementation.
pub fn mention(ctx: &Context, pr: u64, dry_run: bool) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(mention_async(ctx, pr, dry_run))
}

async fn mention_async(ctx: &Context, pr: u64, dry_run: bool) -> Result<()> {
    let git = open_repo(ctx)?;
    let config = load_config(&git)?;
    let extra = extra_series(&config)?;
    let forge = forge_for(&config, &git)?;

    // A dry run reads the pull request from the real forge but posts into a
    // recording mock.
    let pull_request = forge
        .get_pull_request(pr)
        .await
        .with_context(|| format!("Failed to fetch pull request #{}", pr))?;
    let recorder = MockForge::new().with_pull_request(pull_request);
    let target: &dyn Forge = if dry_run { &recorder } else { forge.as_ref() };

    let _lock = lock_clone(&git)?;
    let plan = mention_maintainers(target, &git, pr, &extra, config.adopt_an_addon_mention())
        .await
        .context("Failed to mention maintainers")?;

    match plan.comment() {
        Some(body) if dry_run => println!("{}", body),
        Some(_) => {
            if !ctx.quiet {
                println!("Posted comment on #{}", pr);
            }
        }
        None => {
            if !ctx.quiet {
                println!("Nothing to post on #{}", pr);
            }
        }
    }
    Ok(())
}
