//! Error types for the authorization middleware

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Why a request was turned away at the guard
///
/// Both variants map to `401`. An unreachable issuer is logged separately by
/// the middleware but looks the same as a rejected credential to the caller.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardError {
    #[error("Authorization header required")]
    MissingCredential,

    #[error("Invalid token")]
    InvalidCredential,
}

/// Error body returned on rejection
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl GuardError {
    fn code(&self) -> &'static str {
        match self {
            GuardError::MissingCredential => "MISSING_CREDENTIAL",
            GuardError::InvalidCredential => "INVALID_CREDENTIAL",
        }
    }
}

impl IntoResponse for GuardError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
            code: self.code().to_string(),
        };

        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}
