//! API module for the task service

pub mod error;
pub mod handlers;

use axum::{routing::get, Json, Router};
use std::sync::Arc;
use taskmesh_guard::{cors_layer, health_response, protect, Guard, HealthResponse};
use tower_http::trace::TraceLayer;

use handlers::AppState;

/// Service name reported by the health endpoint
pub const SERVICE_NAME: &str = "task-service";

/// Health check endpoint
///
/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(health_response(SERVICE_NAME, env!("CARGO_PKG_VERSION")))
}

/// Create the API router
///
/// Every task route sits behind `guard`; `/health` stays open.
pub fn create_router(state: Arc<AppState>, guard: Guard) -> Router {
    let cors = cors_layer(&state.cors_origins);

    let tasks = Router::new()
        .route(
            "/api/tasks",
            get(handlers::list_tasks).post(handlers::create_task),
        )
        .route(
            "/api/tasks/{id}",
            get(handlers::get_task)
                .put(handlers::update_task)
                .delete(handlers::delete_task),
        );

    protect(tasks, guard)
        // Health endpoint
        .route("/health", get(health))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
