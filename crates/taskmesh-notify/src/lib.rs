//! Notification Server
//!
//! Holds webhook subscriptions and fans events out to them.
//!
//! ## Delivery model
//!
//! Each event is delivered to every registered target by its own detached
//! task, with one attempt bounded by a 10 second timeout. Delivery is at most
//! once: failures are logged and never retried, and the publisher never waits.
//! Subscriptions live in memory for the life of the process.
//!
//! ## API Endpoints
//!
//! - `GET /health` - Liveness check
//! - `POST /api/webhooks` - Register `{event, url}`
//! - `GET /api/webhooks` - List registrations
//! - `POST /api/webhooks/{event}` - Publish any JSON payload under `event`
//! - `GET /api/notifications` - List notifications
//! - `POST /api/notifications` - Create a notification
//! - `PUT /api/notifications/{id}/read` - Mark one read
//! - `PUT /api/notifications/read-all` - Mark all read
//! - `POST /api/demo/send-notification` - Same as creating a notification

pub mod api;
pub mod config;
pub mod dispatcher;
pub mod notifications;
pub mod registry;

pub use api::create_router;
pub use api::handlers::AppState;
pub use config::NotifyConfig;
pub use dispatcher::{
    DeliveryError, DeliveryReport, Dispatcher, PublishReceipt, DEFAULT_DELIVERY_TIMEOUT,
};
pub use notifications::{Notification, NotificationStore};
pub use registry::{SubscriptionError, SubscriptionRegistry};
