//! API request handlers

pub mod notifications;
pub mod webhooks;

use crate::dispatcher::Dispatcher;
use crate::notifications::NotificationStore;

pub use notifications::{create_notification, list_notifications, mark_all_read, mark_read};
pub use webhooks::{list_webhooks, register_webhook, trigger_webhook};

/// Application state shared across handlers
pub struct AppState {
    /// Fan-out dispatcher, which also owns the subscription registry
    pub dispatcher: Dispatcher,
    pub notifications: NotificationStore,
    /// Allowed CORS origins
    pub cors_origins: Vec<String>,
}
