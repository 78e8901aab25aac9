//! Webhook subscription and trigger handlers

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::api::error::ApiError;

/// Request to register a webhook
#[derive(Debug, Deserialize)]
pub struct RegisterWebhookRequest {
    #[serde(default, alias = "eventName")]
    pub event: String,

    #[serde(default, alias = "targetAddress")]
    pub url: String,
}

/// Acknowledgement of a registration
#[derive(Debug, Serialize)]
pub struct RegisterWebhookResponse {
    pub status: String,
    pub event: String,
    pub url: String,
}

/// All registered webhooks
#[derive(Debug, Serialize)]
pub struct ListWebhooksResponse {
    pub subscriptions: BTreeMap<String, Vec<String>>,
}

/// Acknowledgement of a trigger
#[derive(Debug, Serialize)]
pub struct TriggerWebhookResponse {
    pub status: String,
    pub event: String,
    pub targets: usize,
}

/// Register a target for an event
///
/// POST /api/webhooks
pub async fn register_webhook(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RegisterWebhookRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterWebhookResponse>), ApiError> {
    let Json(request) = body?;
    state
        .dispatcher
        .registry()
        .subscribe(&request.event, &request.url)?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterWebhookResponse {
            status: "webhook registered".into(),
            event: request.event.trim().to_string(),
            url: request.url.trim().to_string(),
        }),
    ))
}

/// List every registered webhook
///
/// GET /api/webhooks
pub async fn list_webhooks(State(state): State<Arc<AppState>>) -> Json<ListWebhooksResponse> {
    Json(ListWebhooksResponse {
        subscriptions: state.dispatcher.registry().snapshot(),
    })
}

/// Publish an arbitrary JSON payload under `event`
///
/// POST /api/webhooks/{event}
///
/// Answers once deliveries are scheduled; their outcomes are only logged.
pub async fn trigger_webhook(
    State(state): State<Arc<AppState>>,
    Path(event): Path<String>,
    body: Bytes,
) -> Result<Json<TriggerWebhookResponse>, ApiError> {
    let data: serde_json::Value = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e)))?;

    let receipt = state.dispatcher.publish(&event, data);

    Ok(Json(TriggerWebhookResponse {
        status: "webhooks triggered".into(),
        event: receipt.event,
        targets: receipt.targets,
    }))
}
