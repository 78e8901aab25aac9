//! Issuer Server Binary
//!
//! Runs the issuer HTTP server.

use std::sync::Arc;

use anyhow::Context;
use taskmesh_core::CredentialCodec;
use tracing::{info, warn};

use taskmesh_issuer::{create_router, open_store, AppState, CredentialStore, Issuer, IssuerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = IssuerConfig::from_env().context("invalid issuer configuration")?;

    taskmesh_guard::init_tracing(&config.log_level).context("failed to set tracing subscriber")?;

    if config.using_dev_secret {
        warn!("JWT_SECRET not set, using the development signing secret");
    }

    // Initialize storage
    let store = open_store(config.database_url.as_deref())
        .await
        .context("failed to open subject store")?;

    let accounts = CredentialStore::new(store);
    accounts
        .bootstrap(config.dev_mode)
        .await
        .context("failed to bootstrap development subject")?;

    let issuer = Issuer::new(accounts, CredentialCodec::new(config.jwt_secret.as_bytes()));

    info!(
        port = config.port,
        persistent = config.database_url.is_some(),
        dev_mode = config.dev_mode,
        "Starting issuer"
    );

    // Create application state
    let state = Arc::new(AppState {
        issuer,
        cors_origins: config.cors_origins.clone(),
    });

    // Build router
    let app = create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(addr = %addr, "Issuer listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
