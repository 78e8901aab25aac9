//! Task Server Binary
//!
//! Runs the task HTTP server.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use taskmesh_tasks::{
    build_guard, build_publisher, create_router, AppState, MemoryTaskStore, TaskServiceConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = TaskServiceConfig::from_env().context("invalid task service configuration")?;

    taskmesh_guard::init_tracing(&config.log_level).context("failed to set tracing subscriber")?;

    let guard = build_guard(&config).context("failed to build credential verifier")?;
    let events = build_publisher(&config).context("failed to build event publisher")?;

    info!(
        port = config.port,
        verifier = guard.verifier().description(),
        auth_service = %config.auth_service_url,
        notifications = config.notification_service_url.as_deref().unwrap_or("disabled"),
        "Starting task service"
    );

    // Create application state
    let state = Arc::new(AppState {
        store: Arc::new(MemoryTaskStore::new()),
        events,
        cors_origins: config.cors_origins.clone(),
    });

    // Build router
    let app = create_router(state, guard);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(addr = %addr, "Task service listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
