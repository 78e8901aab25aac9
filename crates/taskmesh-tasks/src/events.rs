//! Domain event forwarding
//!
//! Task changes are announced to the notification service by POSTing the
//! task as the payload of `/api/webhooks/{event}`. Forwarding is detached:
//! the handler never waits, and failures are only logged.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

/// Raised after a task is created
pub const TASK_CREATED: &str = "task.created";
/// Raised after a task is updated
pub const TASK_UPDATED: &str = "task.updated";
/// Raised after a task is deleted
pub const TASK_DELETED: &str = "task.deleted";

/// Upper bound on one forward to the notification service
pub const DEFAULT_FORWARD_TIMEOUT: Duration = Duration::from_secs(10);

/// Somewhere to announce domain events
pub trait EventPublisher: Send + Sync {
    /// Announce `event`; must not block on delivery
    fn publish(&self, event: &str, data: Value);
}

/// Drops every event; used when no notification service is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPublisher;

impl EventPublisher for NoopPublisher {
    fn publish(&self, event: &str, _data: Value) {
        debug!(event = %event, "No notification service configured, event dropped");
    }
}

/// Forwards events to a notification service
#[derive(Debug, Clone)]
pub struct RemotePublisher {
    base_url: String,
    http_client: reqwest::Client,
}

impl RemotePublisher {
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        Self::with_timeout(base_url, DEFAULT_FORWARD_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
        })
    }

    /// Trigger endpoint for `event`
    pub fn trigger_url(&self, event: &str) -> String {
        format!("{}/api/webhooks/{}", self.base_url, event)
    }
}

impl EventPublisher for RemotePublisher {
    /// Must be called from within a Tokio runtime
    fn publish(&self, event: &str, data: Value) {
        let client = self.http_client.clone();
        let url = self.trigger_url(event);
        let event = event.to_string();

        tokio::spawn(async move {
            match client.post(&url).json(&data).send().await {
                Ok(response) if response.status().is_success() => {
                    debug!(event = %event, "Event forwarded");
                }
                Ok(response) => {
                    warn!(
                        event = %event,
                        status = response.status().as_u16(),
                        "Notification service refused event"
                    );
                }
                Err(e) => {
                    warn!(event = %event, error = %e, "Failed to forward event");
                }
            }
        });
    }
}
