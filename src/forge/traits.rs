//! forge::traits
//!
//! Forge trait definition for the hosting platform the repository lives on.
//!
//! # Design
//!
//! The `Forge` trait is async because forge operations involve network I/O.
//! Only three questions are asked of the platform: may this user push, what
//! is this pull request, and please post this comment.
//!
//! # Example
//!
//! ```ignore
//! use addon_steward::forge::{Forge, ForgeError};
//!
//! async fn greet(forge: &dyn Forge, number: u64) -> Result<(), ForgeError> {
//!     let pr = forge.get_pull_request(number).await?;
//!     forge.post_comment(number, &format!("Thanks @{}!", pr.author)).await
//! }
//! ```

use async_trait::async_trait;
use thiserror::Error;

/// Errors from forge operations.
#[derive(Debug, Clone, Error)]
pub enum ForgeError {
    /// Authentication is required but not available.
    #[error("authentication required")]
    AuthRequired,

    /// Authentication failed (invalid token, expired, insufficient permissions).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded.
    #[error("rate limited")]
    RateLimited,

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    NetworkError(String),
}

/// Pull request facts the addon workflows need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// Branch the PR targets
    pub base: String,
    /// Head branch name
    pub head: String,
    /// Login of the user who opened the PR
    pub author: String,
}

/// The hosting platform, as seen by the authorization and mention flows.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
#[async_trait]
pub trait Forge: Send + Sync {
    /// Get the forge name (e.g., "github").
    fn name(&self) -> &'static str;

    /// Does `username` have push permission on the repository?
    ///
    /// A user who is not a collaborator at all gets `Ok(false)`, not an
    /// error.
    async fn user_can_push(&self, username: &str) -> Result<bool, ForgeError>;

    /// Get a pull request by number.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the PR doesn't exist
    async fn get_pull_request(&self, number: u64) -> Result<PullRequest, ForgeError>;

    /// Post `body` as a comment on issue or pull request `number`.
    async fn post_comment(&self, number: u64, body: &str) -> Result<(), ForgeError>;
}
