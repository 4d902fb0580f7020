//! addons
//!
//! Addon discovery, change scoping, and maintainer bookkeeping.
//!
//! # Modules
//!
//! - [`literal`] - Parser for the literal mapping stored in descriptors
//! - [`manifest`] - Locating and reading addon descriptors
//! - [`bump`] - Version bumps written back to a descriptor
//! - [`scope`] - Which addons a change touches (merge simulation)
//! - [`maintainers`] - Maintainer sets unioned across branches
//! - [`authorize`] - May a user merge a change?
//! - [`mention`] - Who to ping about a change
//!
//! # Architecture
//!
//! Every operation that needs a specific branch's view of the addon tree
//! goes through [`crate::git::Git`] and restores the original branch with
//! [`crate::git::BranchRestore`] on every exit path. Callers that may run
//! concurrently against the same clone serialize with
//! [`crate::core::ops::lock::CloneLock`].

pub mod authorize;
pub mod bump;
pub mod literal;
pub mod maintainers;
pub mod manifest;
pub mod mention;
pub mod scope;

pub use manifest::{Manifest, ManifestError, MANIFEST_NAMES};
pub use scope::ChangeScope;

use thiserror::Error;

use crate::core::types::TypeError;
use crate::core::version::VersionError;
use crate::forge::ForgeError;
use crate::git::GitError;

/// Errors from multi-step addon operations.
#[derive(Debug, Error)]
pub enum AddonError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Version(#[from] VersionError),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Forge(#[from] ForgeError),

    #[error(transparent)]
    Type(#[from] TypeError),

    /// A file name in the diff is not valid UTF-8 or names no directory.
    #[error("cannot attribute path '{0}'")]
    UnattributablePath(String),
}
