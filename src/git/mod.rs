//! git
//!
//! Single interface for all Git operations.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to Git. No other module imports
//! `git2`. Work tree reads done by the addon operations depend on which
//! branch this interface last checked out, so every operation that moves
//! HEAD pairs it with a [`BranchRestore`] guard.
//!
//! # Responsibilities
//!
//! - Repository discovery and opening
//! - Current branch, checkout, `checkout -B`
//! - Merge (fast-forward or merge commit, conflicts reported, never left half-done)
//! - Name-only diffs between revisions
//! - Committing selected paths
//!
//! # Example
//!
//! ```ignore
//! use addon_steward::git::{BranchRestore, Git};
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! let restore = BranchRestore::capture(&git)?;
//! git.checkout("16.0")?;
//! // ... read the 16.0 work tree ...
//! restore.restore()?;
//! ```

mod interface;
mod restore;

pub use interface::{Git, GitError, GitState, RepoInfo};
pub use restore::BranchRestore;
