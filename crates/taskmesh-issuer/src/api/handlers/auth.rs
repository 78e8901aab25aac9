//! Issuance and identity handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use taskmesh_core::Subject;
use taskmesh_guard::extract_bearer;

use super::AppState;
use crate::api::error::ApiError;
use crate::core::IssuedCredential;

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default, alias = "handle")]
    pub username: String,

    #[serde(default, alias = "passphrase")]
    pub password: String,
}

/// Registration request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default, alias = "handle")]
    pub username: String,

    #[serde(default, alias = "contact")]
    pub email: String,

    #[serde(default, alias = "passphrase")]
    pub password: String,
}

/// Exchange a handle and passphrase for a credential
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<IssuedCredential>, ApiError> {
    let Json(request) = body?;
    let issued = state
        .issuer
        .login(&request.username, &request.password)
        .await?;
    Ok(Json(issued))
}

/// Create a subject and return its first credential
///
/// POST /api/auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<IssuedCredential>), ApiError> {
    let Json(request) = body?;
    let issued = state
        .issuer
        .register(&request.username, &request.email, &request.password)
        .await?;
    Ok((StatusCode::CREATED, Json(issued)))
}

/// Current record of the subject named by the presented credential
///
/// GET /api/auth/user
pub async fn current_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Subject>, ApiError> {
    let token = extract_bearer(&headers)
        .ok_or_else(|| ApiError::Unauthorized("Authorization header required".into()))?;
    let subject = state.issuer.resolve_identity(token).await?;
    Ok(Json(subject))
}
