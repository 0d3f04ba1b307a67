//! Request context resolution tests
//! One request resolves its token and request id once, however many extractors ask
mod common;

use axum::{
    extract::FromRequestParts,
    http::{header, StatusCode},
    routing::get,
    Json, Router,
};
use common::{request, TestApp};
use serde_json::{json, Value};
use vibesia_core::{AuditContext, CatalogStorage};
use vibesia_server::middleware::{CurrentUser, RequestContext};

#[tokio::test]
async fn test_context_is_resolved_once_per_request() {
    let app = TestApp::new().await;
    let user = app.create_user("alice", "alice@example.com", "pw").await;
    let token = app.token_for(&user);

    let (mut parts, _body) = request("GET", "/api/v1/playlists", Some(&token), None).into_parts();

    let first = RequestContext::from_request_parts(&mut parts, &app.state)
        .await
        .unwrap();
    assert_eq!(first.audit.app_user_id(), user.id.to_string());
    assert!(!first.audit.request_id.is_empty());

    // Once resolved, the account is no longer looked up for this request
    app.catalog
        .delete_user(&AuditContext::system("tests"), user.id)
        .await
        .unwrap();

    let current = CurrentUser::from_request_parts(&mut parts, &app.state)
        .await
        .unwrap();
    assert_eq!(current.user.id, user.id);
    assert_eq!(current.audit.request_id, first.audit.request_id);

    // A fresh request does see the deletion
    let (mut fresh, _body) = request("GET", "/api/v1/playlists", Some(&token), None).into_parts();
    let anonymous = RequestContext::from_request_parts(&mut fresh, &app.state)
        .await
        .unwrap();
    assert!(anonymous.user.is_none());
    assert_ne!(anonymous.audit.request_id, first.audit.request_id);
}

async fn both_contexts(context: RequestContext, current: CurrentUser) -> Json<Value> {
    Json(json!({
        "context_request_id": context.audit.request_id,
        "user_request_id": current.audit.request_id,
        "user_id": current.user.id,
    }))
}

#[tokio::test]
async fn test_extractors_in_one_handler_share_the_context() {
    let mut app = TestApp::new().await;
    let user = app.create_user("alice", "alice@example.com", "pw").await;

    app.router = Router::new()
        .route("/whoami", get(both_contexts))
        .with_state(app.state.clone());

    let (status, body) = app
        .send(request("GET", "/whoami", Some(&app.token_for(&user)), None))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], user.id.get());
    assert_eq!(body["context_request_id"], body["user_request_id"]);
    assert!(uuid_like(body["context_request_id"].as_str().unwrap()));
}

#[tokio::test]
async fn test_caller_request_id_is_kept() {
    let app = TestApp::new().await;

    let mut req = request("GET", "/api/v1/health", None, None);
    req.headers_mut()
        .insert("x-request-id", "trace-abc".parse().unwrap());
    req.headers_mut()
        .insert(header::USER_AGENT, "vibesia-tests/1.0".parse().unwrap());
    let (mut parts, _body) = req.into_parts();

    let context = RequestContext::from_request_parts(&mut parts, &app.state)
        .await
        .unwrap();
    assert_eq!(context.audit.request_id, "trace-abc");
    assert_eq!(context.audit.user_agent, "vibesia-tests/1.0");
    assert!(context.user.is_none());
}

fn uuid_like(value: &str) -> bool {
    value.len() == 36 && value.chars().filter(|c| *c == '-').count() == 4
}
