//! git::restore
//!
//! Scoped restore of the checked-out branch.
//!
//! # Invariants
//!
//! - The branch checked out at [`BranchRestore::capture`] is checked out
//!   again when the guard is consumed by [`BranchRestore::restore`] or
//!   dropped, whichever comes first.
//! - On the drop path a restore failure is logged, never raised, so the
//!   error that caused the early return is the one the caller sees.

use tracing::{debug, warn};

use super::{Git, GitError};
use crate::core::types::BranchName;

/// Puts the original branch back when an operation that moves HEAD ends.
#[derive(Debug)]
pub struct BranchRestore<'a> {
    git: &'a Git,
    original: BranchName,
    done: bool,
}

impl<'a> BranchRestore<'a> {
    /// Record the currently checked-out branch.
    ///
    /// # Errors
    ///
    /// [`GitError::DetachedHead`] if there is no branch to come back to.
    pub fn capture(git: &'a Git) -> Result<Self, GitError> {
        let original = git.current_branch()?;
        debug!(branch = %original, "captured branch to restore");
        Ok(Self {
            git,
            original,
            done: false,
        })
    }

    /// The branch that will be restored.
    pub fn original(&self) -> &BranchName {
        &self.original
    }

    /// Check the original branch out again, reporting failure.
    pub fn restore(mut self) -> Result<(), GitError> {
        self.done = true;
        debug!(branch = %self.original, "restoring branch");
        self.git.checkout(self.original.as_str())
    }
}

impl Drop for BranchRestore<'_> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        if let Err(e) = self.git.checkout(self.original.as_str()) {
            warn!(branch = %self.original, error = %e, "failed to restore branch");
        }
    }
}
