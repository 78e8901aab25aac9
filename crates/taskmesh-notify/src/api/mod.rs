//! API module for the notification server

pub mod error;
pub mod handlers;

use axum::{
    routing::{get, post, put},
    Json, Router,
};
use std::sync::Arc;
use taskmesh_guard::{cors_layer, health_response, HealthResponse};
use tower_http::trace::TraceLayer;

use handlers::AppState;

/// Service name reported by the health endpoint
pub const SERVICE_NAME: &str = "notification-service";

/// Health check endpoint
///
/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(health_response(SERVICE_NAME, env!("CARGO_PKG_VERSION")))
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.cors_origins);

    Router::new()
        // Health endpoint
        .route("/health", get(health))
        // Notification endpoints
        .route(
            "/api/notifications",
            get(handlers::list_notifications).post(handlers::create_notification),
        )
        .route("/api/notifications/read-all", put(handlers::mark_all_read))
        .route("/api/notifications/{id}/read", put(handlers::mark_read))
        .route(
            "/api/demo/send-notification",
            post(handlers::create_notification),
        )
        // Webhook endpoints
        .route(
            "/api/webhooks",
            get(handlers::list_webhooks).post(handlers::register_webhook),
        )
        .route("/api/webhooks/{event}", post(handlers::trigger_webhook))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
