/*!
 * Integration tests for the Ghost Admin API client against a mock server
 */

use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use proofreader::document::{DocumentBody, DocumentStatus};
use proofreader::editorial::{ConflictGuard, PatchedBody};
use proofreader::errors::{ApplyError, StoreError};
use proofreader::store::{BodyUpdate, DocumentStore, GhostClient};
use proofreader::VersionStamp;

use crate::common;

fn post(id: &str, status: &str, lexical: Option<String>, html: &str) -> Value {
    json!({
        "id": id,
        "title": format!("Post {}", id),
        "status": status,
        "html": html,
        "mobiledoc": null,
        "lexical": lexical,
        "updated_at": common::STAMP,
    })
}

async fn client_for(server: &MockServer) -> GhostClient {
    GhostClient::new(&server.uri(), common::ADMIN_KEY).unwrap()
}

/// Test reading a post with a Lexical body
#[tokio::test]
async fn test_getDocument_withLexicalPost_shouldMapTreeBodyAndStamp() {
    let server = MockServer::start().await;
    let lexical = common::lexical_doc(&["Hello"]);

    Mock::given(method("GET"))
        .and(path("/ghost/api/admin/posts/p1/"))
        .and(query_param("formats", "html,mobiledoc,lexical"))
        .and(header_exists("Authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "posts": [post("p1", "draft", Some(lexical.clone()), "<p>Hello</p>")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let document = client_for(&server).await.get_document("p1").await.unwrap();

    assert_eq!(document.id, "p1");
    assert_eq!(document.status, DocumentStatus::Draft);
    assert_eq!(document.updated_at.as_str(), common::STAMP);
    assert_eq!(
        document.body,
        DocumentBody::Tree { lexical, html: Some("<p>Hello</p>".to_string()) }
    );

    let requests = server.received_requests().await.unwrap();
    let authorization = requests[0].headers.get("Authorization").unwrap().to_str().unwrap();
    assert!(authorization.starts_with("Ghost "));
    assert_eq!(authorization.matches('.').count(), 2);
}

/// Test listing published posts
#[tokio::test]
async fn test_listDocuments_withStatus_shouldFilterAndLimit() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ghost/api/admin/posts/"))
        .and(query_param("filter", "status:published"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "posts": [
                post("a", "published", None, "<p>One</p>"),
                post("b", "published", None, "<p>Two</p>"),
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let documents = client_for(&server)
        .await
        .list_documents(Some(DocumentStatus::Published), 2)
        .await
        .unwrap();

    assert_eq!(documents.len(), 2);
    assert!(documents.iter().all(|d| d.status == DocumentStatus::Published));
    assert_eq!(documents[1].body, DocumentBody::Flat { html: "<p>Two</p>".to_string() });
}

/// Test that a tree write sends the Lexical body with the read stamp
#[tokio::test]
async fn test_updateDocument_withLexical_shouldSendBodyAndStamp() {
    let server = MockServer::start().await;
    let lexical = common::lexical_doc(&["Fixed"]);

    Mock::given(method("PUT"))
        .and(path("/ghost/api/admin/posts/p1/"))
        .and(body_partial_json(json!({
            "posts": [{ "lexical": lexical, "updated_at": common::STAMP }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "posts": [{
                "id": "p1",
                "title": "Post p1",
                "status": "draft",
                "lexical": lexical,
                "updated_at": "2024-05-01T10:05:00.000Z",
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let saved = client_for(&server)
        .await
        .update_document("p1", BodyUpdate::Lexical(lexical.clone()), &VersionStamp::new(common::STAMP))
        .await
        .unwrap();

    assert_eq!(saved.updated_at.as_str(), "2024-05-01T10:05:00.000Z");
    let requests = server.received_requests().await.unwrap();
    assert!(!requests[0].url.query().unwrap_or_default().contains("source=html"));
}

/// Test that a flat write asks the store to convert from HTML
#[tokio::test]
async fn test_updateDocument_withHtml_shouldRequestHtmlSource() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/ghost/api/admin/posts/p1/"))
        .and(query_param("source", "html"))
        .and(body_partial_json(json!({ "posts": [{ "html": "<p>Fixed</p>" }] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "posts": [post("p1", "draft", None, "<p>Fixed</p>")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let saved = client_for(&server)
        .await
        .update_document("p1", BodyUpdate::Html("<p>Fixed</p>".to_string()), &VersionStamp::new(common::STAMP))
        .await
        .unwrap();

    assert_eq!(saved.body.html(), Some("<p>Fixed</p>"));
}

/// Test HTTP status mapping
#[tokio::test]
async fn test_errors_shouldMapStatusCodes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ghost/api/admin/posts/gone/"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ghost/api/admin/posts/locked/"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad token"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ghost/api/admin/posts/broken/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;

    assert!(matches!(client.get_document("gone").await, Err(StoreError::NotFound(ref id)) if id == "gone"));
    assert!(matches!(client.get_document("locked").await, Err(StoreError::Authentication(_))));
    assert!(matches!(
        client.get_document("broken").await,
        Err(StoreError::Api { status_code: 500, .. })
    ));
}

/// Test that a stale write through the guard is reported as a conflict
#[tokio::test]
async fn test_guard_withStoreConflict_shouldReturnConflict() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ghost/api/admin/posts/p1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "posts": [post("p1", "draft", None, "<p>Old</p>")]
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/ghost/api/admin/posts/p1/"))
        .respond_with(ResponseTemplate::new(409).set_body_string(
            r#"{"errors":[{"type":"UpdateCollisionError","message":"Saving failed! Someone else is editing this post."}]}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let document = client.get_document("p1").await.unwrap();
    let guard = ConflictGuard::capture(&document);

    let result = guard
        .apply(&client, PatchedBody::Flat("<p>New</p>".to_string()))
        .await;

    match result {
        Err(ApplyError::Conflict(message)) => assert!(message.contains("UpdateCollisionError")),
        other => panic!("expected a conflict, got {:?}", other),
    }
}
