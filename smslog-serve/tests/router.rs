//! Router tests driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::FixedOffset;
use serde_json::Value;
use smslog_core::{FileLogStore, LogStore, MemoryLogStore};
use smslog_serve::{router, AppState};
use tempfile::TempDir;
use tower::ServiceExt;

const HELLO: &str = "address=%2B255700000000&body=Hello&timestamp=1700000000000&type=received";

fn app_with(store: Arc<dyn LogStore>) -> Router {
    router(AppState::new(store, FixedOffset::east_opt(0).unwrap()))
}

fn app() -> Router {
    app_with(Arc::new(MemoryLogStore::new()))
}

fn post_form(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/messages")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_post_then_duplicate() {
    let app = app();

    let (status, body) = send(&app, post_form(HELLO)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let (status, body) = send(&app, post_form(HELLO)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "duplicate");
    assert_eq!(body["hash"].as_str().unwrap().len(), 64);

    let (status, body) = send(&app, get("/messages")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        serde_json::json!([{
            "sender": "+255700000000",
            "timestamp": "2023-11-14 22:13:20",
            "message": "Hello"
        }])
    );
}

#[tokio::test]
async fn test_missing_body_is_bad_request() {
    let app = app();

    let (status, body) = send(
        &app,
        post_form("address=%2B255700000000&timestamp=1700000000000&type=received"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().starts_with("Invalid data"));

    let (_, body) = send(&app, get("/messages")).await;
    assert_eq!(body, serde_json::json!([]));
}

#[tokio::test]
async fn test_legacy_form_is_accepted() {
    let app = app();

    let (status, body) = send(
        &app,
        post_form("sender=M-PESA&body=Confirmed&timestamp=1700000000000"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
}

#[tokio::test]
async fn test_wrong_method_is_405() {
    let app = app();
    let request = Request::builder()
        .method(Method::PUT)
        .uri("/messages")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Invalid request method");
}

#[tokio::test]
async fn test_missing_log_reads_empty() {
    let dir = TempDir::new().unwrap();
    let store = FileLogStore::new(
        dir.path().join("sms/messages.txt"),
        dir.path().join("sms/message_hashes.txt"),
    );
    let app = app_with(Arc::new(store));

    let (status, body) = send(&app, get("/messages")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!([]));
}

#[tokio::test]
async fn test_conversations_most_recent_first() {
    let store = MemoryLogStore::with_lines([
        "Sender: M-PESA, Timestamp: 2023-11-14 08:00:00, Message: Balance is Ksh100",
        "[2023-11-14 09:00:00] RECEIVED | +255700000000 | Hi there",
        "[2023-11-14 09:05:00] SENT | +255700000000 | Hello back, this reply is long enough to need a cut",
    ]);
    let app = app_with(Arc::new(store));

    let (status, body) = send(&app, get("/conversations?preview_chars=10")).await;
    assert_eq!(status, StatusCode::OK);

    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["address"], "+255700000000");
    assert_eq!(list[0]["message_count"], 2);
    assert_eq!(list[0]["latest_timestamp"], "2023-11-14 09:05:00");
    assert_eq!(list[0]["preview"], "Hello back...");
    assert_eq!(list[0]["messages"][0]["message"], "Hi there");
    assert_eq!(list[1]["address"], "M-PESA");
}

#[tokio::test]
async fn test_stats_counts() {
    let store = MemoryLogStore::with_lines([
        "Sender: M-PESA, Timestamp: 2023-11-14 08:00:00, Message: Balance",
        "[2023-11-14 09:00:00] RECEIVED | +255700000000 | Hi",
        "[2023-11-14 09:05:00] SENT | +255700000000 | Hello",
        "garbage line",
    ]);
    let app = app_with(Arc::new(store));

    let (status, body) = send(&app, get("/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        serde_json::json!({
            "total": 3,
            "sent": 1,
            "received": 1,
            "unspecified": 1,
            "unparsed": 1
        })
    );
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(&app(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
