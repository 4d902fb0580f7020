//! core::types
//!
//! Strong types for the names this crate passes around.
//!
//! # Types
//!
//! - [`BranchName`] - Validated Git branch name
//! - [`AddonName`] - Addon identifier (its directory name)
//!
//! # Validation
//!
//! Both types enforce validity at construction time, so a value that made
//! it past `new` can be joined onto a path or handed to git without
//! further checks.
//!
//! # Examples
//!
//! ```
//! use addon_steward::core::types::{AddonName, BranchName};
//!
//! let branch = BranchName::new("16.0").unwrap();
//! let addon = AddonName::new("date_range").unwrap();
//! assert_eq!(branch.as_str(), "16.0");
//! assert_eq!(addon.as_str(), "date_range");
//!
//! assert!(BranchName::new("bad..name").is_err());
//! assert!(AddonName::new("nested/dir").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("invalid addon name: {0}")]
    InvalidAddonName(String),
}

/// A validated Git branch name.
///
/// Follows the subset of `git check-ref-format` rules that matter for
/// branches checked out by this crate:
/// - not empty, not exactly `@`
/// - no leading `.` or `-`, no trailing `/` or `.lock`
/// - no `..`, `@{`, `//`, whitespace, control characters or `~^:\?*[`
/// - no path component starting with `.` or ending with `.lock`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    /// Create a new validated branch name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidBranchName` if the name violates Git's refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    fn validate(name: &str) -> Result<(), TypeError> {
        let reject = |why: &str| Err(TypeError::InvalidBranchName(format!("'{name}' {why}")));

        if name.is_empty() {
            return reject("is empty");
        }
        if name == "@" {
            return reject("is reserved");
        }
        if name.starts_with('.') || name.starts_with('-') {
            return reject("has a forbidden leading character");
        }
        if name.ends_with('/') || name.ends_with(".lock") {
            return reject("has a forbidden suffix");
        }
        for seq in ["..", "@{", "//"] {
            if name.contains(seq) {
                return reject(&format!("contains '{seq}'"));
            }
        }
        if name
            .chars()
            .any(|c| c.is_ascii_control() || c.is_whitespace() || "~^:\\?*[".contains(c))
        {
            return reject("contains a forbidden character");
        }
        if name
            .split('/')
            .any(|part| part.starts_with('.') || part.ends_with(".lock"))
        {
            return reject("has a forbidden path component");
        }
        Ok(())
    }

    /// Get the branch name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BranchName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<BranchName> for String {
    fn from(name: BranchName) -> Self {
        name.0
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An addon identifier.
///
/// An addon is named after the directory holding its descriptor, so the
/// name must be a single path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AddonName(String);

impl AddonName {
    /// Create a new validated addon name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidAddonName` for empty names, `.`/`..`, or
    /// names containing a path separator.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        if name.is_empty() || name == "." || name == ".." {
            return Err(TypeError::InvalidAddonName(format!(
                "'{name}' is not a directory name"
            )));
        }
        if name.contains('/') || name.contains('\\') {
            return Err(TypeError::InvalidAddonName(format!(
                "'{name}' contains a path separator"
            )));
        }
        Ok(Self(name))
    }

    /// Get the addon name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AddonName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<AddonName> for String {
    fn from(name: AddonName) -> Self {
        name.0
    }
}

impl AsRef<str> for AddonName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AddonName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
