//! Integration tests for the notification API

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use taskmesh_notify::{create_router, AppState, Dispatcher, NotificationStore, SubscriptionRegistry};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tower::ServiceExt;

// =============================================================================
// Test Helpers
// =============================================================================

fn app() -> Router {
    let dispatcher =
        Dispatcher::with_timeout(Arc::new(SubscriptionRegistry::new()), Duration::from_secs(2)).unwrap();
    create_router(Arc::new(AppState {
        dispatcher,
        notifications: NotificationStore::new(),
        cors_origins: vec!["*".into()],
    }))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn sink() -> (String, UnboundedReceiver<Value>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let app = Router::new()
        .route(
            "/hook",
            post(
                |State(tx): State<UnboundedSender<Value>>, Json(body): Json<Value>| async move {
                    let _ = tx.send(body);
                    StatusCode::OK
                },
            ),
        )
        .with_state(tx);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}/hook", addr), rx)
}

async fn next(rx: &mut UnboundedReceiver<Value>) -> Value {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for delivery")
        .expect("sink closed")
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health() {
    let (status, body) = send(&app(), empty_request("GET", "/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "notification-service");
    assert_eq!(body["status"], "healthy");
}

// =============================================================================
// Webhooks
// =============================================================================

#[tokio::test]
async fn test_register_and_list_webhooks() {
    let app = app();

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/webhooks",
            json!({"event": "task.created", "url": "http://sink.test/a"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "webhook registered");

    // Descriptive aliases, and a duplicate that is kept
    send(
        &app,
        json_request(
            "POST",
            "/api/webhooks",
            json!({"eventName": "task.created", "targetAddress": "http://sink.test/a"}),
        ),
    )
    .await;

    let (status, body) = send(&app, empty_request("GET", "/api/webhooks")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"subscriptions": {"task.created": ["http://sink.test/a", "http://sink.test/a"]}})
    );
}

#[tokio::test]
async fn test_register_webhook_validation() {
    let app = app();

    for body in [
        json!({"event": "task.created"}),
        json!({"url": "http://sink.test/a"}),
        json!({"event": "task.created", "url": "not a url"}),
        json!({"event": "task.created", "url": "file:///etc/passwd"}),
    ] {
        let (status, _) = send(&app, json_request("POST", "/api/webhooks", body.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {body}");
    }

    let (_, listed) = send(&app, empty_request("GET", "/api/webhooks")).await;
    assert_eq!(listed["subscriptions"], json!({}));
}

#[tokio::test]
async fn test_trigger_without_subscribers() {
    let (status, body) = send(
        &app(),
        json_request("POST", "/api/webhooks/task.created", json!({"id": 1})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"status": "webhooks triggered", "event": "task.created", "targets": 0})
    );
}

#[tokio::test]
async fn test_trigger_rejects_unparseable_body() {
    let request = Request::post("/api/webhooks/task.created")
        .body(Body::from("{oops"))
        .unwrap();

    let (status, _) = send(&app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_trigger_delivers_to_registered_sink() {
    let app = app();
    let (url, mut rx) = sink().await;

    send(
        &app,
        json_request("POST", "/api/webhooks", json!({"event": "task.created", "url": url})),
    )
    .await;

    let (status, body) = send(
        &app,
        json_request("POST", "/api/webhooks/task.created", json!({"id": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["targets"], 1);

    assert_eq!(
        next(&mut rx).await,
        json!({"event": "task.created", "data": {"id": 1}})
    );
}

// =============================================================================
// Notifications
// =============================================================================

#[tokio::test]
async fn test_create_notification_defaults_and_event() {
    let app = app();
    let (url, mut rx) = sink().await;
    send(
        &app,
        json_request(
            "POST",
            "/api/webhooks",
            json!({"event": "notification.created", "url": url}),
        ),
    )
    .await;

    let (status, created) = send(
        &app,
        json_request(
            "POST",
            "/api/notifications",
            json!({"user_id": 1, "title": "Hi", "message": "Welcome"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["type"], "info");
    assert_eq!(created["read"], false);

    let delivered = next(&mut rx).await;
    assert_eq!(delivered["event"], "notification.created");
    assert_eq!(delivered["data"]["id"], created["id"]);

    let (_, listed) = send(&app, empty_request("GET", "/api/notifications")).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_demo_send_creates_notification() {
    let app = app();

    let (status, created) = send(
        &app,
        json_request(
            "POST",
            "/api/demo/send-notification",
            json!({"user_id": 2, "title": "Demo", "message": "Hello", "type": "success"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["type"], "success");
    assert_eq!(created["user_id"], 2);

    let (_, listed) = send(&app, empty_request("GET", "/api/notifications")).await;
    assert_eq!(listed[0]["id"], created["id"]);
}

#[tokio::test]
async fn test_create_notification_requires_title_and_message() {
    let (status, body) = send(
        &app(),
        json_request("POST", "/api/notifications", json!({"user_id": 1, "title": "x"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_mark_read() {
    let app = app();
    let (url, mut rx) = sink().await;
    send(
        &app,
        json_request("POST", "/api/webhooks", json!({"event": "notification.read", "url": url})),
    )
    .await;

    let (_, created) = send(
        &app,
        json_request("POST", "/api/notifications", json!({"user_id": 1, "title": "t", "message": "m"})),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let (status, _) = send(&app, empty_request("PUT", &format!("/api/notifications/{id}/read"))).await;
    assert_eq!(status, StatusCode::OK);

    let delivered = next(&mut rx).await;
    assert_eq!(delivered["data"]["notification_id"], id);
    assert!(delivered["data"]["timestamp"].is_string());

    let (status, _) = send(&app, empty_request("PUT", "/api/notifications/999/read")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, empty_request("PUT", "/api/notifications/abc/read")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_mark_all_read() {
    let app = app();
    for title in ["a", "b"] {
        send(
            &app,
            json_request("POST", "/api/notifications", json!({"user_id": 1, "title": title, "message": "m"})),
        )
        .await;
    }

    let (status, body) = send(&app, empty_request("PUT", "/api/notifications/read-all")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);

    let (_, listed) = send(&app, empty_request("GET", "/api/notifications")).await;
    assert!(listed.as_array().unwrap().iter().all(|n| n["read"] == true));
}
