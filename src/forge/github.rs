//! forge::github
//!
//! GitHub forge implementation using the REST API.
//!
//! # Endpoints
//!
//! - `GET /repos/{owner}/{repo}/collaborators/{user}/permission` for push rights
//! - `GET /repos/{owner}/{repo}/pulls/{number}` for pull request facts
//! - `POST /repos/{owner}/{repo}/issues/{number}/comments` to comment
//!
//! # Rate Limiting
//!
//! GitHub has rate limits. This implementation:
//! - Returns `ForgeError::RateLimited` when limits are hit
//! - Does not implement automatic retry for rate limits (caller's responsibility)
//!
//! # Example
//!
//! ```ignore
//! use addon_steward::forge::github::GitHubForge;
//! use addon_steward::forge::Forge;
//!
//! let forge = GitHubForge::new(token, "OCA", "server-tools");
//! if forge.user_can_push("octocat").await? {
//!     println!("octocat may merge anything");
//! }
//! ```

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::{Forge, ForgeError, PullRequest};
use crate::core::config::DEFAULT_API_BASE;

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = "addon-steward";

/// Permission levels that include push access.
const PUSH_PERMISSIONS: [&str; 2] = ["admin", "write"];

/// GitHub forge implementation.
pub struct GitHubForge {
    /// HTTP client for making requests
    client: Client,
    /// Personal access token or app installation token
    token: String,
    /// Repository owner (user or organization)
    owner: String,
    /// Repository name
    repo: String,
    /// API base URL (configurable for GitHub Enterprise)
    api_base: String,
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for GitHubForge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubForge")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl GitHubForge {
    /// Create a GitHub forge against the public API.
    pub fn new(token: impl Into<String>, owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self::with_api_base(token, owner, repo, DEFAULT_API_BASE)
    }

    /// Create a GitHub forge with a custom API base URL.
    ///
    /// Use this for GitHub Enterprise (e.g. `https://github.example.com/api/v3`)
    /// and for tests against a local mock server.
    pub fn with_api_base(
        token: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        let api_base: String = api_base.into();
        Self {
            client: Client::new(),
            token: token.into(),
            owner: owner.into(),
            repo: repo.into(),
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Create a GitHub forge from a remote URL.
    ///
    /// Returns `None` if the URL does not point at github.com.
    pub fn from_remote_url(url: &str, token: impl Into<String>) -> Option<Self> {
        let (owner, repo) = parse_github_url(url)?;
        Some(Self::new(token, owner, repo))
    }

    /// Get the repository owner.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Get the repository name.
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Build common headers for API requests.
    fn headers(&self) -> Result<HeaderMap, ForgeError> {
        if self.token.is_empty() {
            return Err(ForgeError::AuthRequired);
        }
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.token))
                .map_err(|_| ForgeError::AuthFailed("token is not a valid header value".into()))?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        Ok(headers)
    }

    /// Build URL for a repository endpoint.
    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_base, self.owner, self.repo, path
        )
    }

    /// Handle API response, mapping errors appropriately.
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: Response,
    ) -> Result<T, ForgeError> {
        let status = response.status();

        if status.is_success() {
            response.json().await.map_err(|e| ForgeError::ApiError {
                status: status.as_u16(),
                message: format!("Failed to parse response: {}", e),
            })
        } else {
            self.handle_error_response(response, status).await
        }
    }

    /// Handle an error response from the API.
    async fn handle_error_response<T>(
        &self,
        response: Response,
        status: StatusCode,
    ) -> Result<T, ForgeError> {
        // GitHub Apps report missing permissions in this header
        let required_permissions = response
            .headers()
            .get("X-Accepted-GitHub-Permissions")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let message = match response.json::<GitHubErrorResponse>().await {
            Ok(err) => err.message,
            Err(_) => "Unknown error".to_string(),
        };

        Err(match status {
            StatusCode::UNAUTHORIZED => ForgeError::AuthFailed("Invalid or expired token".into()),
            StatusCode::FORBIDDEN => {
                let mut err_msg = format!("Permission denied: {}", message);
                if let Some(perms) = required_permissions.filter(|p| !p.is_empty()) {
                    err_msg.push_str(&format!(" [required: {}]", perms));
                }
                ForgeError::AuthFailed(err_msg)
            }
            StatusCode::NOT_FOUND => ForgeError::NotFound(message),
            StatusCode::TOO_MANY_REQUESTS => ForgeError::RateLimited,
            _ if status.is_server_error() => ForgeError::ApiError {
                status: status.as_u16(),
                message: format!("GitHub server error: {}", message),
            },
            _ => ForgeError::ApiError {
                status: status.as_u16(),
                message,
            },
        })
    }
}

#[async_trait]
impl Forge for GitHubForge {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn user_can_push(&self, username: &str) -> Result<bool, ForgeError> {
        let url = self.repo_url(&format!("collaborators/{}/permission", username));
        let response = self
            .client
            .get(&url)
            .headers(self.headers()?)
            .send()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))?;

        let result: Result<GitHubPermission, ForgeError> = self.handle_response(response).await;
        let permission = match result {
            Ok(p) => p,
            // Not a collaborator
            Err(ForgeError::NotFound(_)) => return Ok(false),
            Err(e) => return Err(e),
        };

        let can_push = PUSH_PERMISSIONS.contains(&permission.permission.as_str())
            || permission
                .user
                .and_then(|u| u.permissions)
                .is_some_and(|p| p.push);
        debug!(username, permission = %permission.permission, can_push, "collaborator permission");
        Ok(can_push)
    }

    async fn get_pull_request(&self, number: u64) -> Result<PullRequest, ForgeError> {
        let url = self.repo_url(&format!("pulls/{}", number));
        let response = self
            .client
            .get(&url)
            .headers(self.headers()?)
            .send()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))?;

        let pr: GitHubPullRequest = self.handle_response(response).await?;
        Ok(pr.into())
    }

    async fn post_comment(&self, number: u64, body: &str) -> Result<(), ForgeError> {
        let url = self.repo_url(&format!("issues/{}/comments", number));
        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(&GitHubCommentRequest { body })
            .send()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))?;

        let _: serde_json::Value = self.handle_response(response).await?;
        debug!(number, "posted comment");
        Ok(())
    }
}

// --------------------------------------------------------------------------
// GitHub API Types
// --------------------------------------------------------------------------

#[derive(Deserialize)]
struct GitHubErrorResponse {
    message: String,
}

#[derive(Serialize)]
struct GitHubCommentRequest<'a> {
    body: &'a str,
}

#[derive(Deserialize)]
struct GitHubPermission {
    permission: String,
    #[serde(default)]
    user: Option<GitHubCollaborator>,
}

#[derive(Deserialize)]
struct GitHubCollaborator {
    #[serde(default)]
    permissions: Option<GitHubRepoPermissions>,
}

#[derive(Deserialize)]
struct GitHubRepoPermissions {
    #[serde(default)]
    push: bool,
}

#[derive(Deserialize)]
struct GitHubPullRequest {
    number: u64,
    user: GitHubUser,
    head: GitHubRef,
    base: GitHubRef,
}

#[derive(Deserialize)]
struct GitHubUser {
    login: String,
}

#[derive(Deserialize)]
struct GitHubRef {
    #[serde(rename = "ref")]
    ref_name: String,
}

impl From<GitHubPullRequest> for PullRequest {
    fn from(pr: GitHubPullRequest) -> Self {
        PullRequest {
            number: pr.number,
            base: pr.base.ref_name,
            head: pr.head.ref_name,
            author: pr.user.login,
        }
    }
}

// --------------------------------------------------------------------------
// URL Parsing
// --------------------------------------------------------------------------

/// Parse a GitHub remote URL to extract owner and repo.
///
/// Supports both SSH and HTTPS formats:
/// - `git@github.com:owner/repo.git`
/// - `https://github.com/owner/repo.git`
/// - `https://github.com/owner/repo`
///
/// # Example
///
/// ```
/// use addon_steward::forge::github::parse_github_url;
///
/// let (owner, repo) = parse_github_url("git@github.com:OCA/server-tools.git").unwrap();
/// assert_eq!(owner, "OCA");
/// assert_eq!(repo, "server-tools");
/// ```
pub fn parse_github_url(url: &str) -> Option<(String, String)> {
    let rest = url
        .strip_prefix("git@github.com:")
        .or_else(|| url.strip_prefix("https://github.com/"))
        .or_else(|| url.strip_prefix("http://github.com/"))?;
    let rest = rest.strip_suffix(".git").unwrap_or(rest);
    let (owner, repo) = rest.split_once('/')?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return None;
    }
    Some((owner.to_string(), repo.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    mod parse_github_url {
        use super::*;

        #[test]
        fn ssh_with_git_suffix() {
            assert_eq!(
                parse_github_url("git@github.com:OCA/server-tools.git"),
                Some(("OCA".to_string(), "server-tools".to_string()))
            );
        }

        #[test]
        fn https_without_git_suffix() {
            assert_eq!(
                parse_github_url("https://github.com/OCA/web"),
                Some(("OCA".to_string(), "web".to_string()))
            );
        }

        #[test]
        fn non_github_url() {
            assert_eq!(parse_github_url("git@gitlab.com:OCA/web.git"), None);
        }

        #[test]
        fn invalid_format() {
            assert_eq!(parse_github_url("https://github.com/OCA"), None);
            assert_eq!(parse_github_url("https://github.com/OCA/"), None);
        }
    }

    mod forge {
        use super::*;

        #[test]
        fn repo_url_format() {
            let forge = GitHubForge::with_api_base("t", "OCA", "web", "https://ghe.example.com/api/v3/");
            assert_eq!(
                forge.repo_url("pulls/7"),
                "https://ghe.example.com/api/v3/repos/OCA/web/pulls/7"
            );
        }

        #[test]
        fn debug_redacts_token() {
            let forge = GitHubForge::new("ghp_secret", "OCA", "web");
            let debug = format!("{:?}", forge);
            assert!(!debug.contains("ghp_secret"));
            assert!(debug.contains("OCA"));
        }

        #[test]
        fn empty_token_requires_auth() {
            let forge = GitHubForge::new("", "OCA", "web");
            assert!(matches!(forge.headers(), Err(ForgeError::AuthRequired)));
        }

        #[test]
        fn from_remote_url() {
            let forge = GitHubForge::from_remote_url("git@github.com:OCA/web.git", "t").unwrap();
            assert_eq!(forge.owner(), "OCA");
            assert_eq!(forge.repo(), "web");
            assert_eq!(forge.name(), "github");
        }
    }
}
