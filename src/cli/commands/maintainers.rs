//! cli::commands::maintainers
//!
//! Show addon maintainers, unioned across branches.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context as _, Result};

use super::{lock_clone, open_repo, Context};
use crate::addons::maintainers::resolve_maintainers;
use crate::core::types::BranchName;

/// Run the maintainers command.
pub fn maintainers(ctx: &Context, addons: &[PathBuf], branches: &[String], json: bool) -> Result<()> {
    let branches = branches
        .iter()
        .map(|b| BranchName::new(b.as_str()).with_context(|| format!("Invalid branch name '{}'", b)))
        .collect::<Result<Vec<_>>>()?;

    let git = open_repo(ctx)?;
    let _lock = lock_clone(&git)?;
    let map = resolve_maintainers(&git, addons, &branches).context("Failed to resolve maintainers")?;

    if json {
        let output: BTreeMap<&str, Vec<&str>> = map
            .iter()
            .map(|(addon, logins)| (addon.as_str(), logins.iter().map(String::as_str).collect()))
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for (addon, logins) in &map {
        if logins.is_empty() {
            println!("{}: (none)", addon);
        } else {
            let logins: Vec<&str> = logins.iter().map(String::as_str).collect();
            println!("{}: {}", addon, logins.join(", "));
        }
    }
    Ok(())
}
