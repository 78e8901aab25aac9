//! API module for the issuer server

pub mod error;
pub mod handlers;

use axum::{
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use taskmesh_guard::{cors_layer, health_response, HealthResponse};
use tower_http::trace::TraceLayer;

use handlers::AppState;

/// Service name reported by the health endpoint
pub const SERVICE_NAME: &str = "auth-service";

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
        // Issuance
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/register", post(handlers::register))
        // Verification
        .route("/api/auth/validate", get(handlers::validate))
        .route("/api/auth/user", get(handlers::current_user))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
