//! addons::manifest
//!
//! Locating and reading addon descriptors.
//!
//! A directory is an addon if it holds one of the recognized descriptor
//! files. Only `name`, `version`, `installable` and `maintainers` are
//! extracted; every other key is ignored.
//!
//! Nothing here caches: the work tree changes under our feet whenever a
//! branch is checked out, so every query reads the file again.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use super::literal::parse_literal;
use crate::core::types::AddonName;

/// Recognized descriptor file names, in lookup priority order.
pub const MANIFEST_NAMES: [&str; 3] = ["__manifest__.py", "__openerp__.py", "__terp__.py"];

/// Errors from descriptor operations.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The directory holds no recognized descriptor.
    #[error("no manifest found in {}", dir.display())]
    NotFound { dir: PathBuf },

    #[error("failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The descriptor is not a valid literal mapping, or a known key has
    /// the wrong type.
    #[error("failed to parse manifest '{}': {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("manifest '{}' declares no version", path.display())]
    MissingVersion { path: PathBuf },
}

/// The part of a descriptor this crate cares about.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Manifest {
    /// Human readable name (informational only)
    #[serde(default)]
    pub name: Option<String>,

    /// `SERIES.MAJOR.MINOR.PATCH`
    #[serde(default)]
    pub version: Option<String>,

    /// Absent means installable
    #[serde(default)]
    pub installable: Option<bool>,

    /// Declared maintainer logins
    #[serde(default)]
    pub maintainers: BTreeSet<String>,
}

impl Manifest {
    pub fn is_installable(&self) -> bool {
        self.installable.unwrap_or(true)
    }
}

/// Path of the descriptor in `addon_dir`, if there is one.
pub fn manifest_path(addon_dir: &Path) -> Option<PathBuf> {
    MANIFEST_NAMES
        .iter()
        .map(|name| addon_dir.join(name))
        .find(|path| path.is_file())
}

/// File name (without directory) of the descriptor in `addon_dir`.
pub fn manifest_file_name(addon_dir: &Path) -> Option<&'static str> {
    MANIFEST_NAMES
        .iter()
        .copied()
        .find(|name| addon_dir.join(name).is_file())
}

/// Parse descriptor content. `path` is only used for error reporting.
pub fn parse_manifest(content: &str, path: &Path) -> Result<Manifest, ManifestError> {
    let parse_error = |message: String| ManifestError::Parse {
        path: path.to_path_buf(),
        message,
    };
    let value = parse_literal(content).map_err(|e| parse_error(e.to_string()))?;
    if !value.is_object() {
        return Err(parse_error("descriptor is not a mapping".to_string()));
    }
    serde_json::from_value(value).map_err(|e| parse_error(e.to_string()))
}

/// Read the descriptor of `addon_dir`, `None` if the directory has none.
pub fn find_manifest(addon_dir: &Path) -> Result<Option<Manifest>, ManifestError> {
    let Some(path) = manifest_path(addon_dir) else {
        return Ok(None);
    };
    let content = fs::read_to_string(&path).map_err(|e| ManifestError::Read {
        path: path.clone(),
        source: e,
    })?;
    parse_manifest(&content, &path).map(Some)
}

/// Read the descriptor of `addon_dir`.
///
/// # Errors
///
/// [`ManifestError::NotFound`] if the directory has no descriptor.
pub fn read_manifest(addon_dir: &Path) -> Result<Manifest, ManifestError> {
    find_manifest(addon_dir)?.ok_or_else(|| ManifestError::NotFound {
        dir: addon_dir.to_path_buf(),
    })
}

/// Is `dir` an addon?
///
/// With `installable_only`, the descriptor must also not be marked
/// uninstallable, which requires parsing it.
pub fn is_addon_dir(dir: &Path, installable_only: bool) -> Result<bool, ManifestError> {
    if !installable_only {
        return Ok(manifest_path(dir).is_some());
    }
    Ok(find_manifest(dir)?.is_some_and(|m| m.is_installable()))
}

/// Addon directories directly under `addons_dir`, sorted by path.
pub fn addon_dirs_in(addons_dir: &Path, installable_only: bool) -> Result<Vec<PathBuf>, ManifestError> {
    let read_error = |e| ManifestError::Read {
        path: addons_dir.to_path_buf(),
        source: e,
    };
    let mut dirs = Vec::new();
    for entry in fs::read_dir(addons_dir).map_err(read_error)? {
        let path = entry.map_err(read_error)?.path();
        if path.is_dir() && is_addon_dir(&path, installable_only)? {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Does `addons_dir` contain at least one addon?
pub fn is_addons_dir(addons_dir: &Path, installable_only: bool) -> Result<bool, ManifestError> {
    Ok(!addon_dirs_in(addons_dir, installable_only)?.is_empty())
}

/// Addon name of a directory (its last path component).
pub fn addon_name(addon_dir: &Path) -> Option<AddonName> {
    let name = addon_dir.file_name()?.to_str()?;
    AddonName::new(name).ok()
}

fn version_key_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?P<pre>["']version["']\s*:\s*["'])(?P<version>[\d.]+)(?P<post>["'])"#)
            .expect("version key pattern is valid")
    })
}

/// Rewrite the `version` value in the descriptor text of `addon_dir`.
///
/// Only the quoted version literal is replaced; all other bytes of the
/// file are kept. Precondition: the descriptor has a single `version`
/// key whose value is a quoted run of digits and dots.
pub fn set_manifest_version(addon_dir: &Path, version: &str) -> Result<(), ManifestError> {
    let path = manifest_path(addon_dir).ok_or_else(|| ManifestError::NotFound {
        dir: addon_dir.to_path_buf(),
    })?;
    let content = fs::read_to_string(&path).map_err(|e| ManifestError::Read {
        path: path.clone(),
        source: e,
    })?;

    if !version_key_re().is_match(&content) {
        return Err(ManifestError::MissingVersion { path });
    }
    let updated = version_key_re().replace_all(&content, |caps: &regex::Captures<'_>| {
        format!("{}{}{}", &caps["pre"], version, &caps["post"])
    });

    write_manifest(&path, &updated)
}

fn write_manifest(path: &Path, content: &str) -> Result<(), ManifestError> {
    fs::write(path, content).map_err(|e| ManifestError::Write {
        path: path.to_path_buf(),
        source: e,
    })
}
