//! API request handlers

pub mod tasks;

use std::sync::Arc;

use crate::events::EventPublisher;
use crate::storage::TaskStore;

pub use tasks::{create_task, delete_task, get_task, list_tasks, update_task};

/// Application state shared across handlers
pub struct AppState {
    pub store: Arc<dyn TaskStore>,
    /// Where task changes are announced
    pub events: Arc<dyn EventPublisher>,
    /// Allowed CORS origins
    pub cors_origins: Vec<String>,
}
