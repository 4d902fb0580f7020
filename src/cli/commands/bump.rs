//! cli::commands::bump
//!
//! Bump an addon's version, optionally committing the descriptor.

use std::path::Path;

use anyhow::{Context as _, Result};

use super::{open_repo, Context};
use crate::addons::bump::bump_manifest_version;
use crate::core::version::BumpMode;

/// Run the bump command.
pub fn bump(ctx: &Context, addon: &Path, mode: BumpMode, commit: bool) -> Result<()> {
    let addon_dir = ctx.cwd()?.join(addon);

    let git = if commit { Some(open_repo(ctx)?) } else { None };
    let version = bump_manifest_version(&addon_dir, mode, git.as_ref())
        .with_context(|| format!("Failed to bump {}", addon.display()))?;

    println!("{}", version);
    Ok(())
}
