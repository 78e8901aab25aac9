//! Notification handlers
//!
//! Each change raises a webhook event through the dispatcher.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use super::AppState;
use crate::api::error::ApiError;
use crate::notifications::{NewNotification, Notification};

/// Request to create a notification
#[derive(Debug, Deserialize)]
pub struct CreateNotificationRequest {
    #[serde(default)]
    pub user_id: i64,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub message: String,

    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// List notifications, newest first
///
/// GET /api/notifications
pub async fn list_notifications(State(state): State<Arc<AppState>>) -> Json<Vec<Notification>> {
    Json(state.notifications.list())
}

/// Create a notification
///
/// POST /api/notifications
pub async fn create_notification(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateNotificationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Notification>), ApiError> {
    let Json(request) = body?;
    if request.title.trim().is_empty() || request.message.trim().is_empty() {
        return Err(ApiError::BadRequest("Title and message are required".into()));
    }

    let notification = state.notifications.create(NewNotification {
        user_id: request.user_id,
        title: request.title,
        message: request.message,
        kind: request
            .kind
            .filter(|k| !k.trim().is_empty())
            .unwrap_or_else(|| "info".to_string()),
    });

    let data = serde_json::to_value(&notification).unwrap_or(Value::Null);
    state.dispatcher.publish("notification.created", data);

    Ok((StatusCode::CREATED, Json(notification)))
}

/// Mark one notification read
///
/// PUT /api/notifications/{id}/read
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id: i64 = id
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid notification ID".into()))?;

    state
        .notifications
        .mark_read(id)
        .ok_or_else(|| ApiError::NotFound(format!("Notification {} not found", id)))?;

    info!(notification_id = id, "Marked notification as read");
    state.dispatcher.publish(
        "notification.read",
        json!({"notification_id": id, "timestamp": Utc::now()}),
    );

    Ok(Json(json!({"status": "marked as read"})))
}

/// Mark every notification read
///
/// PUT /api/notifications/read-all
pub async fn mark_all_read(State(state): State<Arc<AppState>>) -> Json<Value> {
    let changed = state.notifications.mark_all_read();

    info!(count = changed, "Marked all notifications as read");
    state
        .dispatcher
        .publish("notifications.read_all", json!({"timestamp": Utc::now()}));

    Json(json!({"status": "all marked as read", "count": changed}))
}
