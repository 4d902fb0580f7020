//! forge::factory
//!
//! Forge creation from configuration.
//!
//! # Design
//!
//! Commands use [`create_forge`] instead of constructing a specific forge,
//! so the addon workflows only ever see `dyn Forge`.
//!
//! The repository is taken from the `[forge]` config table when both
//! `owner` and `repo` are set, otherwise from the clone's remote URL.

use super::github::{parse_github_url, GitHubForge};
use super::traits::{Forge, ForgeError};
use crate::core::config::Config;

/// Create the forge for a repository.
///
/// # Errors
///
/// - `AuthRequired` if `token` is empty
/// - `NotFound` if neither config nor `remote_url` names a GitHub repository
pub fn create_forge(
    config: &Config,
    token: &str,
    remote_url: Option<&str>,
) -> Result<Box<dyn Forge>, ForgeError> {
    if token.is_empty() {
        return Err(ForgeError::AuthRequired);
    }

    let (owner, repo) = match (config.forge_owner(), config.forge_repo()) {
        (Some(owner), Some(repo)) => (owner.to_string(), repo.to_string()),
        _ => remote_url.and_then(parse_github_url).ok_or_else(|| {
            ForgeError::NotFound(
                "no forge repository configured and the remote is not a GitHub URL".to_string(),
            )
        })?,
    };

    Ok(Box::new(GitHubForge::with_api_base(
        token,
        owner,
        repo,
        config.api_base(),
    )))
}
