//! addons::scope
//!
//! Which addons does the checked-out branch change, compared to a target?
//!
//! # Architecture
//!
//! A plain diff between the change branch and the target also reports
//! files that differ only because the target moved on. To see just what
//! the change introduces, the merge is simulated:
//!
//! 1. Remember the checked-out branch
//! 2. Check out the target
//! 3. Reset [`SCRATCH_BRANCH`] to it and check that out
//! 4. Merge the original branch into the scratch branch
//! 5. Diff names between the target and the scratch branch
//! 6. Check the original branch out again
//!
//! Step 6 runs on every exit path through [`BranchRestore`]. The scratch
//! branch is left behind and reset on the next run.
//!
//! Changed paths are attributed to addons on the restored tree, so an
//! addon the change deletes is never reported.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use super::manifest::is_addon_dir;
use super::AddonError;
use crate::core::types::{AddonName, BranchName};
use crate::git::{BranchRestore, Git, GitError};

/// Disposable branch the merge is simulated on.
pub const SCRATCH_BRANCH: &str = "tmp-git-modified-addons";

/// Directory holding the legacy per-addon packaging layout.
const SETUP_DIR: &str = "setup";

/// Addons touched by a change, and whether anything else was touched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeScope {
    /// Names of the modified addons that still exist after the change.
    pub addons: BTreeSet<AddonName>,
    /// A changed path could not be attributed to any addon.
    pub other_changes: bool,
}

impl ChangeScope {
    /// Only addons were touched, and at least one of them.
    pub fn is_addons_only(&self) -> bool {
        !self.other_changes && !self.addons.is_empty()
    }
}

/// Compute the addons the checked-out branch modifies relative to `target`.
///
/// Moves HEAD while running and restores the original branch before
/// returning, including on error.
///
/// # Errors
///
/// - [`GitError::DetachedHead`] if no branch is checked out
/// - [`GitError::OperationInProgress`] if a merge or rebase is underway
/// - [`GitError::MergeConflict`] if the change does not merge cleanly
pub fn modified_addons(git: &Git, target: &str) -> Result<ChangeScope, AddonError> {
    let state = git.state();
    if state.is_in_progress() {
        return Err(GitError::OperationInProgress { operation: state }.into());
    }

    let guard = BranchRestore::capture(git)?;
    let original = guard.original().clone();
    info!(branch = %original, target, "scoping change");

    let paths = simulate_merge(git, &original, target)?;
    guard.restore()?;

    let scope = classify_paths(git.work_dir()?, &paths)?;
    info!(
        addons = scope.addons.len(),
        other_changes = scope.other_changes,
        "change scoped"
    );
    Ok(scope)
}

/// Like [`modified_addons`], also returning the absolute addon directories.
pub fn modified_addon_dirs(git: &Git, target: &str) -> Result<(Vec<PathBuf>, ChangeScope), AddonError> {
    let scope = modified_addons(git, target)?;
    let work_dir = git.work_dir()?;
    let dirs = scope
        .addons
        .iter()
        .map(|name| work_dir.join(name.as_str()))
        .collect();
    Ok((dirs, scope))
}

fn simulate_merge(git: &Git, original: &BranchName, target: &str) -> Result<Vec<String>, GitError> {
    let scratch = BranchName::new(SCRATCH_BRANCH)?;

    git.checkout(target)?;
    git.checkout_new_branch(&scratch, target)?;
    git.merge(original.as_str())?;

    let paths = git.diff_name_only(target, scratch.as_str())?;
    debug!(count = paths.len(), "changed paths");
    Ok(paths)
}

/// Attribute changed paths to addons under `work_dir`.
///
/// - A root-level file is another change
/// - `setup/<name>/...` belongs to `<name>` if either packaged layout
///   holds that addon
/// - Otherwise the first path segment must be an addon directory
pub fn classify_paths<S: AsRef<str>>(work_dir: &Path, paths: &[S]) -> Result<ChangeScope, AddonError> {
    let mut scope = ChangeScope::default();

    for path in paths.iter().map(AsRef::as_ref).filter(|p| !p.is_empty()) {
        let Some((first, rest)) = path.split_once('/') else {
            debug!(path, "root level change");
            scope.other_changes = true;
            continue;
        };

        let candidate = if first == SETUP_DIR {
            let name = rest.split('/').next().unwrap_or_default();
            packaged_addon(work_dir, name)?
        } else if is_addon_dir(&work_dir.join(first), false)? {
            Some(first)
        } else {
            None
        };

        match candidate.map(AddonName::new).transpose() {
            Ok(Some(name)) => {
                scope.addons.insert(name);
            }
            Ok(None) | Err(_) => {
                debug!(path, "change outside any addon");
                scope.other_changes = true;
            }
        }
    }

    Ok(scope)
}

fn packaged_addon<'a>(work_dir: &Path, name: &'a str) -> Result<Option<&'a str>, AddonError> {
    if name.is_empty() {
        return Ok(None);
    }
    let package = work_dir.join(SETUP_DIR).join(name);
    let layouts = [
        package.join("odoo_addons").join(name),
        package.join("odoo").join("addons").join(name),
    ];
    for dir in &layouts {
        if is_addon_dir(dir, false)? {
            return Ok(Some(name));
        }
    }
    Ok(None)
}
