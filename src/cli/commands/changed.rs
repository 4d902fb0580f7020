//! cli::commands::changed
//!
//! List the addons the checked-out branch modifies relative to a target.

use anyhow::{Context as _, Result};
use serde::Serialize;

use super::{lock_clone, open_repo, Context};
use crate::addons::scope::modified_addons;

#[derive(Serialize)]
struct ChangedOutput<'a> {
    target: &'a str,
    addons: Vec<&'a str>,
    other_changes: bool,
}

/// Run the changed command.
pub fn changed(ctx: &Context, target: &str, json: bool) -> Result<()> {
    let git = open_repo(ctx)?;
    let _lock = lock_clone(&git)?;

    let scope = modified_addons(&git, target)
        .with_context(|| format!("Failed to compute modified addons against '{}'", target))?;

    if json {
        let output = ChangedOutput {
            target,
            addons: scope.addons.iter().map(|a| a.as_str()).collect(),
            other_changes: scope.other_changes,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if scope.addons.is_empty() {
        println!("No addon modified.");
    }
    for addon in &scope.addons {
        println!("{}", addon);
    }
    if scope.other_changes {
        println!("(files outside addons are modified too)");
    }
    Ok(())
}
