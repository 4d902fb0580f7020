//! GitHub forge against a local mock server.

use addon_steward::forge::github::GitHubForge;
use addon_steward::forge::{Forge, ForgeError};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PERMISSION_PATH: &str = "/repos/OCA/web/collaborators/octocat/permission";

fn forge_for(server: &MockServer) -> GitHubForge {
    GitHubForge::with_api_base("test-token", "OCA", "web", server.uri())
}

async fn permission_response(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(PERMISSION_PATH))
        .respond_with(template)
        .mount(server)
        .await;
}

#[tokio::test]
async fn write_permission_can_push() {
    let server = MockServer::start().await;
    permission_response(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({ "permission": "write" })),
    )
    .await;

    assert!(forge_for(&server).user_can_push("octocat").await.unwrap());
}

#[tokio::test]
async fn read_permission_cannot_push() {
    let server = MockServer::start().await;
    permission_response(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({
            "permission": "read",
            "user": { "login": "octocat", "permissions": { "push": false, "pull": true } }
        })),
    )
    .await;

    assert!(!forge_for(&server).user_can_push("octocat").await.unwrap());
}

#[tokio::test]
async fn maintain_role_reported_through_push_flag() {
    let server = MockServer::start().await;
    permission_response(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({
            "permission": "read",
            "user": { "login": "octocat", "permissions": { "push": true } }
        })),
    )
    .await;

    assert!(forge_for(&server).user_can_push("octocat").await.unwrap());
}

#[tokio::test]
async fn non_collaborator_cannot_push() {
    let server = MockServer::start().await;
    permission_response(
        &server,
        ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })),
    )
    .await;

    assert!(!forge_for(&server).user_can_push("octocat").await.unwrap());
}

#[tokio::test]
async fn bad_token_is_auth_failure() {
    let server = MockServer::start().await;
    permission_response(
        &server,
        ResponseTemplate::new(401).set_body_json(json!({ "message": "Bad credentials" })),
    )
    .await;

    let result = forge_for(&server).user_can_push("octocat").await;
    assert!(matches!(result, Err(ForgeError::AuthFailed(_))));
}

#[tokio::test]
async fn rate_limit_is_reported() {
    let server = MockServer::start().await;
    permission_response(&server, ResponseTemplate::new(429)).await;

    let result = forge_for(&server).user_can_push("octocat").await;
    assert!(matches!(result, Err(ForgeError::RateLimited)));
}

#[tokio::test]
async fn pull_request_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/OCA/web/pulls/42"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "number": 42,
            "title": "[16.0][FIX] web_widget",
            "user": { "login": "contributor" },
            "head": { "ref": "16.0-fix-web_widget", "sha": "abc" },
            "base": { "ref": "16.0", "sha": "def" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let pr = forge_for(&server).get_pull_request(42).await.unwrap();

    assert_eq!(pr.number, 42);
    assert_eq!(pr.base, "16.0");
    assert_eq!(pr.head, "16.0-fix-web_widget");
    assert_eq!(pr.author, "contributor");
}

#[tokio::test]
async fn comment_is_posted_on_the_issue() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/repos/OCA/web/issues/42/comments"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_json(json!({ "body": "Hi @alice,\nhello" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 1 })))
        .expect(1)
        .mount(&server)
        .await;

    forge_for(&server)
        .post_comment(42, "Hi @alice,\nhello")
        .await
        .unwrap();
}

#[tokio::test]
async fn empty_token_never_reaches_the_server() {
    let server = MockServer::start().await;
    let forge = GitHubForge::with_api_base("", "OCA", "web", server.uri());

    let result = forge.post_comment(1, "x").await;

    assert!(matches!(result, Err(ForgeError::AuthRequired)));
    assert!(server.received_requests().await.unwrap().is_empty());
}
