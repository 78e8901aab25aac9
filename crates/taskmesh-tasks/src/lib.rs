//! Task Server
//!
//! A resource service whose every task route requires a credential minted by
//! the issuer. Callers only ever see and change their own tasks, and each
//! change is announced to the notification service.
//!
//! ## API Endpoints
//!
//! - `GET /health` - Liveness check (open)
//! - `GET /api/tasks?status=&priority=` - List the caller's tasks
//! - `POST /api/tasks` - Create a task
//! - `GET /api/tasks/{id}` - Fetch a task
//! - `PUT /api/tasks/{id}` - Update some fields of a task
//! - `DELETE /api/tasks/{id}` - Delete a task

pub mod api;
pub mod config;
pub mod events;
pub mod storage;

use std::sync::Arc;

use taskmesh_guard::{Guard, LocalVerifier, RemoteVerifier};

pub use api::create_router;
pub use api::handlers::AppState;
pub use config::{AuthMode, TaskServiceConfig};
pub use events::{EventPublisher, NoopPublisher, RemotePublisher};
pub use storage::{MemoryTaskStore, Task, TaskStore, TaskStoreError};

/// Build the guard selected by `config.auth_mode`
pub fn build_guard(config: &TaskServiceConfig) -> Result<Guard, reqwest::Error> {
    Ok(match &config.auth_mode {
        AuthMode::Remote => Guard::new(RemoteVerifier::new(&config.auth_service_url)?),
        AuthMode::Local { jwt_secret } => Guard::new(LocalVerifier::from_secret(jwt_secret.as_bytes())),
    })
}

/// Build the event publisher; without a notification service events are dropped
pub fn build_publisher(config: &TaskServiceConfig) -> Result<Arc<dyn EventPublisher>, reqwest::Error> {
    Ok(match &config.notification_service_url {
        Some(url) => Arc::new(RemotePublisher::new(url.clone())?),
        None => Arc::new(NoopPublisher),
    })
}
