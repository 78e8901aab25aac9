//! Fan-out dispatcher
//!
//! `publish` looks up the event's targets, serializes the `{event, data}`
//! envelope once, and spawns one detached task per target. Each task makes a
//! single `POST` bounded by the delivery timeout. Outcomes are logged and,
//! when a report channel is attached, sent there. Nothing is retried and the
//! publisher never waits on a delivery.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use taskmesh_core::WebhookEnvelope;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info, warn};

use crate::registry::SubscriptionRegistry;

/// Upper bound on a single delivery
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Why a delivery did not succeed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("target answered {0}")]
    Status(u16),
}

/// Outcome of one delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub event: String,
    pub target: String,
    /// HTTP status on success
    pub outcome: Result<u16, DeliveryError>,
}

/// Acknowledgement returned by [`Dispatcher::publish`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishReceipt {
    pub event: String,
    /// Deliveries scheduled
    pub targets: usize,
}

/// Delivers events to every registered target
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<SubscriptionRegistry>,
    http_client: reqwest::Client,
    reports: Option<UnboundedSender<DeliveryReport>>,
}

impl Dispatcher {
    /// Create a dispatcher with the 10s delivery timeout
    pub fn new(registry: Arc<SubscriptionRegistry>) -> Result<Self, reqwest::Error> {
        Self::with_timeout(registry, DEFAULT_DELIVERY_TIMEOUT)
    }

    pub fn with_timeout(
        registry: Arc<SubscriptionRegistry>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            registry,
            http_client,
            reports: None,
        })
    }

    /// Also send every delivery outcome to `sink`
    pub fn with_reports(mut self, sink: UnboundedSender<DeliveryReport>) -> Self {
        self.reports = Some(sink);
        self
    }

    pub fn registry(&self) -> &Arc<SubscriptionRegistry> {
        &self.registry
    }

    /// Schedule delivery of `data` under `event` to every target
    ///
    /// Returns as soon as the deliveries are spawned. Must be called from
    /// within a Tokio runtime.
    pub fn publish(&self, event: &str, data: serde_json::Value) -> PublishReceipt {
        let event = event.trim();
        let targets = self.registry.targets_for(event);
        if targets.is_empty() {
            debug!(event = %event, "No webhooks registered for event");
            return PublishReceipt {
                event: event.to_string(),
                targets: 0,
            };
        }

        let payload = match serde_json::to_vec(&WebhookEnvelope::new(event, data)) {
            Ok(payload) => payload,
            Err(e) => {
                error!(event = %event, error = %e, "Failed to encode webhook envelope");
                return PublishReceipt {
                    event: event.to_string(),
                    targets: 0,
                };
            }
        };

        info!(event = %event, targets = targets.len(), "Triggering webhooks");

        for target in &targets {
            let client = self.http_client.clone();
            let reports = self.reports.clone();
            let event = event.to_string();
            let target = target.clone();
            let payload = payload.clone();

            tokio::spawn(async move {
                let outcome = deliver(&client, &target, payload).await;
                match &outcome {
                    Ok(status) => {
                        info!(event = %event, url = %target, status = status, "Webhook delivered");
                    }
                    Err(e) => {
                        warn!(event = %event, url = %target, error = %e, "Webhook delivery failed");
                    }
                }
                if let Some(reports) = reports {
                    // Receiver may be gone; outcomes are best effort
                    let _ = reports.send(DeliveryReport {
                        event,
                        target,
                        outcome,
                    });
                }
            });
        }

        PublishReceipt {
            event: event.to_string(),
            targets: targets.len(),
        }
    }
}

async fn deliver(
    client: &reqwest::Client,
    target: &str,
    payload: Vec<u8>,
) -> Result<u16, DeliveryError> {
    let response = client
        .post(target)
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body(payload)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                DeliveryError::Timeout
            } else {
                DeliveryError::Transport(e.to_string())
            }
        })?;

    let status = response.status();
    if status.is_success() {
        Ok(status.as_u16())
    } else {
        Err(DeliveryError::Status(status.as_u16()))
    }
}
