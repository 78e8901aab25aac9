//! Credential verification handler
//!
//! Resource services call this on every protected request.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use taskmesh_core::VerifyResponse;
use taskmesh_guard::extract_bearer;

use super::AppState;

/// Check the credential in the `Authorization` header
///
/// GET /api/auth/validate
///
/// Always answers with a [`VerifyResponse`]: `200` when valid, `401` with a
/// reason otherwise.
pub async fn validate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> (StatusCode, Json<VerifyResponse>) {
    let Some(token) = extract_bearer(&headers) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(VerifyResponse::rejected("missing-credential")),
        );
    };

    match state.issuer.verify_presented(token) {
        Ok(identity) => (StatusCode::OK, Json(VerifyResponse::accepted(identity))),
        Err(e) => (
            StatusCode::UNAUTHORIZED,
            Json(VerifyResponse::rejected(e.reason())),
        ),
    }
}
