//! forge::mock
//!
//! Mock forge implementation for deterministic testing.
//!
//! # Design
//!
//! The mock forge provides a deterministic implementation of the `Forge` trait
//! for use in tests. It stores pull requests, push rights and posted comments
//! in memory and allows configuring failure scenarios.
//!
//! # Example
//!
//! ```
//! use addon_steward::forge::mock::MockForge;
//! use addon_steward::forge::Forge;
//!
//! # tokio_test::block_on(async {
//! let forge = MockForge::new().with_pusher("admin");
//!
//! assert!(forge.user_can_push("admin").await.unwrap());
//! assert!(!forge.user_can_push("stranger").await.unwrap());
//!
//! forge.post_comment(3, "hello").await.unwrap();
//! assert_eq!(forge.comments(), vec![(3, "hello".to_string())]);
//! # });
//! ```

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use super::traits::{Forge, ForgeError, PullRequest};

/// Mock forge for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping.
#[derive(Debug, Clone)]
pub struct MockForge {
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockForgeInner>>,
}

/// Internal mutable state.
#[derive(Debug, Default)]
struct MockForgeInner {
    /// Logins with push permission.
    pushers: BTreeSet<String>,
    /// Stored PRs by number.
    prs: HashMap<u64, PullRequest>,
    /// Posted comments, in order.
    comments: Vec<(u64, String)>,
    /// Method to fail on (for testing error paths).
    fail_on: Option<FailOn>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail user_can_push with the given error.
    UserCanPush(ForgeError),
    /// Fail get_pull_request with the given error.
    GetPullRequest(ForgeError),
    /// Fail post_comment with the given error.
    PostComment(ForgeError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    UserCanPush { username: String },
    GetPullRequest { number: u64 },
    PostComment { number: u64, body: String },
}

impl MockForge {
    /// Create a new empty mock forge.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockForgeInner::default())),
        }
    }

    /// Grant push permission to `username`.
    pub fn with_pusher(self, username: impl Into<String>) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.pushers.insert(username.into());
        }
        self
    }

    /// Add a pull request the mock will return.
    pub fn with_pull_request(self, pr: PullRequest) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.prs.insert(pr.number, pr);
        }
        self
    }

    /// Configure the mock to fail on a specific operation.
    ///
    /// # Example
    ///
    /// ```
    /// use addon_steward::forge::mock::{MockForge, FailOn};
    /// use addon_steward::forge::ForgeError;
    ///
    /// let forge = MockForge::new()
    ///     .fail_on(FailOn::UserCanPush(ForgeError::RateLimited));
    /// ```
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.fail_on = Some(fail_on);
        }
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_on = None;
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        let inner = self.inner.lock().unwrap();
        inner.operations.clone()
    }

    /// Comments posted so far, as `(number, body)`.
    pub fn comments(&self) -> Vec<(u64, String)> {
        let inner = self.inner.lock().unwrap();
        inner.comments.clone()
    }

    /// Record an operation.
    fn record(&self, op: MockOperation) {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(op);
    }

    /// Check if we should fail and return the error if so.
    fn check_fail(&self, expected: &str) -> Option<ForgeError> {
        let inner = self.inner.lock().unwrap();
        match &inner.fail_on {
            Some(FailOn::UserCanPush(e)) if expected == "user_can_push" => Some(e.clone()),
            Some(FailOn::GetPullRequest(e)) if expected == "get_pull_request" => Some(e.clone()),
            Some(FailOn::PostComment(e)) if expected == "post_comment" => Some(e.clone()),
            _ => None,
        }
    }
}

impl Default for MockForge {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Forge for MockForge {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn user_can_push(&self, username: &str) -> Result<bool, ForgeError> {
        self.record(MockOperation::UserCanPush {
            username: username.to_string(),
        });
        if let Some(e) = self.check_fail("user_can_push") {
            return Err(e);
        }

        let inner = self.inner.lock().unwrap();
        Ok(inner.pushers.contains(username))
    }

    async fn get_pull_request(&self, number: u64) -> Result<PullRequest, ForgeError> {
        self.record(MockOperation::GetPullRequest { number });
        if let Some(e) = self.check_fail("get_pull_request") {
            return Err(e);
        }

        let inner = self.inner.lock().unwrap();
        inner
            .prs
            .get(&number)
            .cloned()
            .ok_or_else(|| ForgeError::NotFound(format!("PR #{}", number)))
    }

    async fn post_comment(&self, number: u64, body: &str) -> Result<(), ForgeError> {
        self.record(MockOperation::PostComment {
            number,
            body: body.to_string(),
        });
        if let Some(e) = self.check_fail("post_comment") {
            return Err(e);
        }

        let mut inner = self.inner.lock().unwrap();
        inner.comments.push((number, body.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pr(number: u64) -> PullRequest {
        PullRequest {
            number,
            base: "16.0".to_string(),
            head: "16.0-fix".to_string(),
            author: "octocat".to_string(),
        }
    }

    #[tokio::test]
    async fn push_rights() {
        let forge = MockForge::new().with_pusher("admin");
        assert!(forge.user_can_push("admin").await.unwrap());
        assert!(!forge.user_can_push("other").await.unwrap());
        assert_eq!(forge.operations().len(), 2);
    }

    #[tokio::test]
    async fn get_pull_request() {
        let forge = MockForge::new().with_pull_request(pr(7));
        assert_eq!(forge.get_pull_request(7).await.unwrap(), pr(7));
        assert!(matches!(
            forge.get_pull_request(8).await,
            Err(ForgeError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn fail_on_records_but_fails() {
        let forge = MockForge::new().fail_on(FailOn::PostComment(ForgeError::RateLimited));

        assert!(matches!(
            forge.post_comment(1, "x").await,
            Err(ForgeError::RateLimited)
        ));
        assert!(forge.comments().is_empty());
        assert_eq!(
            forge.operations(),
            vec![MockOperation::PostComment {
                number: 1,
                body: "x".to_string()
            }]
        );

        forge.clear_fail_on();
        forge.post_comment(1, "x").await.unwrap();
        assert_eq!(forge.comments().len(), 1);
    }

    #[tokio::test]
    async fn clones_share_state() {
        let forge = MockForge::new();
        let clone = forge.clone();
        clone.post_comment(2, "hi").await.unwrap();
        assert_eq!(forge.comments(), vec![(2, "hi".to_string())]);
    }
}
