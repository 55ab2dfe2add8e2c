//! Behavior-driven tests for the HTTP API
//!
//! Requests go through the full router with the session header set the
//! way the fronting auth proxy would.

mod support;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use support::{market_client, store_with_users, FakeFinnhub};
use tempfile::TempDir;
use tickwatch_web::{create_router, AppState, HeaderSessionProvider};
use tower::ServiceExt;

fn app() -> (TempDir, Router) {
    let (temp, store) = store_with_users(&[("a@x.com", "user-1")]);
    let state = AppState::new(
        Arc::new(store.watchlist()),
        market_client(Arc::new(FakeFinnhub::new().quote_json("AAPL", r#"{"c":190.0,"dp":0.4}"#))),
        Arc::new(HeaderSessionProvider::default()),
    );
    (temp, create_router(state))
}

fn request(method: Method, uri: &str, email: Option<&str>, body: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(email) = email {
        builder = builder.header("x-user-email", email);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_owned())),
        None => builder.body(Body::empty()),
    };
    request.expect("request")
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

// =============================================================================
// API: Session handling
// =============================================================================

#[tokio::test]
async fn health_check_needs_no_session() {
    let (_temp, app) = app();

    let (status, body) = send(&app, request(Method::GET, "/health", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn api_calls_without_session_are_unauthorized() {
    let (_temp, app) = app();

    for (method, uri, body) in [
        (Method::GET, "/api/watchlist", None),
        (Method::GET, "/api/watchlist/symbols", None),
        (Method::POST, "/api/watchlist", Some(r#"{"symbol":"AAPL","company":"Apple"}"#)),
        (Method::DELETE, "/api/watchlist/AAPL", None),
    ] {
        let (status, body) = send(&app, request(method, uri, None, body)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body["error"], "UNAUTHORIZED");
    }
}

#[tokio::test]
async fn page_without_session_is_the_sign_in_prompt() {
    let (_temp, app) = app();

    let (status, body) = send(&app, request(Method::GET, "/watchlist", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["view"], "sign_in_prompt");
}

// =============================================================================
// API: Mutations
// =============================================================================

#[tokio::test]
async fn user_adds_lists_and_removes_through_the_api() {
    let (_temp, app) = app();
    let user = Some("a@x.com");

    // When: The user adds AAPL
    let (status, body) = send(
        &app,
        request(Method::POST, "/api/watchlist", user, Some(r#"{"symbol":"aapl","company":"Apple Inc."}"#)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "message": "Added to watchlist", "failure": null }));

    // Then: It shows up in symbols, entries and the rendered page
    let (_, symbols) = send(&app, request(Method::GET, "/api/watchlist/symbols", user, None)).await;
    assert_eq!(symbols, json!(["AAPL"]));

    let (_, entries) = send(&app, request(Method::GET, "/api/watchlist", user, None)).await;
    assert_eq!(entries[0]["company"], "Apple Inc.");

    let (_, page) = send(&app, request(Method::GET, "/watchlist", user, None)).await;
    assert_eq!(page["view"], "cards");
    assert_eq!(page["cards"][0]["price_display"], "$190.00");

    // When: The user removes it
    let (status, body) = send(&app, request(Method::DELETE, "/api/watchlist/AAPL", user, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Removed from watchlist");

    let (_, symbols) = send(&app, request(Method::GET, "/api/watchlist/symbols", user, None)).await;
    assert_eq!(symbols, json!([]));
}

#[tokio::test]
async fn rejected_mutations_are_reported_in_band() {
    let (_temp, app) = app();
    let user = Some("a@x.com");
    let add = r#"{"symbol":"AAPL","company":"Apple Inc."}"#;

    send(&app, request(Method::POST, "/api/watchlist", user, Some(add))).await;
    let (status, body) = send(&app, request(Method::POST, "/api/watchlist", user, Some(add))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Stock already in watchlist");
    assert_eq!(body["failure"], "duplicate_entry");

    let (status, body) = send(&app, request(Method::DELETE, "/api/watchlist/TSLA", user, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["failure"], "entry_not_found");

    let (_, body) = send(&app, request(Method::POST, "/api/watchlist", user, Some(r#"{"symbol":"AAPL"}"#))).await;
    assert_eq!(body["message"], "Missing required fields");
}

#[tokio::test]
async fn malformed_body_is_a_bad_request() {
    let (_temp, app) = app();

    let (status, body) = send(
        &app,
        request(Method::POST, "/api/watchlist", Some("a@x.com"), Some("{not json")),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BAD_REQUEST");
}
