//! Notification Server Binary
//!
//! Runs the notification HTTP server.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use taskmesh_notify::{
    create_router, AppState, Dispatcher, NotificationStore, NotifyConfig, SubscriptionRegistry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = NotifyConfig::from_env().context("invalid notification service configuration")?;

    taskmesh_guard::init_tracing(&config.log_level).context("failed to set tracing subscriber")?;

    let registry = Arc::new(SubscriptionRegistry::new());
    let dispatcher = Dispatcher::with_timeout(registry, config.webhook_timeout)
        .context("failed to build webhook client")?;

    info!(
        port = config.port,
        webhook_timeout = ?config.webhook_timeout,
        "Starting notification service"
    );

    // Create application state
    let state = Arc::new(AppState {
        dispatcher,
        notifications: NotificationStore::new(),
        cors_origins: config.cors_origins.clone(),
    });

    // Build router
    let app = create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(addr = %addr, "Notification service listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
