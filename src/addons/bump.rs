//! addons::bump
//!
//! Bump the version declared in an addon descriptor, optionally
//! committing the result.

use std::path::Path;

use tracing::info;

use super::manifest::{manifest_path, read_manifest, set_manifest_version, ManifestError};
use super::AddonError;
use crate::core::version::{BumpMode, Version};
use crate::git::Git;

/// Commit message used for automated version bumps.
pub fn bump_commit_message(addon: &str, version: &Version) -> String {
    format!("[BOT] {} {}", addon, version)
}

/// Bump the version of the addon in `addon_dir` and write it back.
///
/// When `commit` is given, only the descriptor file is committed.
///
/// # Errors
///
/// - [`ManifestError::NotFound`] if the directory has no descriptor
/// - [`ManifestError::MissingVersion`] if the descriptor has no version
/// - [`crate::core::version::VersionError::InvalidVersion`] on a
///   malformed version
pub fn bump_manifest_version(
    addon_dir: &Path,
    mode: BumpMode,
    commit: Option<&Git>,
) -> Result<Version, AddonError> {
    let manifest = read_manifest(addon_dir)?;
    let path = manifest_path(addon_dir).ok_or_else(|| ManifestError::NotFound {
        dir: addon_dir.to_path_buf(),
    })?;
    let current = manifest
        .version
        .as_deref()
        .ok_or_else(|| ManifestError::MissingVersion { path: path.clone() })?;

    let next = current.parse::<Version>()?.bump(mode);
    set_manifest_version(addon_dir, &next.to_string())?;
    info!(addon = %addon_dir.display(), from = current, to = %next, "bumped version");

    if let Some(git) = commit {
        let addon = addon_dir
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| AddonError::UnattributablePath(addon_dir.display().to_string()))?;
        let relative = relative_to_work_dir(git, &path)?;
        let oid = git.commit(&bump_commit_message(addon, &next), &[relative.as_path()])?;
        info!(commit = %oid, "committed version bump");
    }

    Ok(next)
}

fn relative_to_work_dir(git: &Git, path: &Path) -> Result<std::path::PathBuf, AddonError> {
    let work_dir = git.work_dir()?;
    let canonical_work = work_dir
        .canonicalize()
        .unwrap_or_else(|_| work_dir.to_path_buf());
    let canonical_path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    canonical_path
        .strip_prefix(&canonical_work)
        .map(Path::to_path_buf)
        .map_err(|_| AddonError::UnattributablePath(path.display().to_string()))
}
