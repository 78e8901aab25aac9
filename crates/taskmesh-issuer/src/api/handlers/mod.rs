//! API request handlers

pub mod auth;
pub mod verify;

use crate::core::Issuer;

pub use auth::{current_user, login, register, LoginRequest, RegisterRequest};
pub use verify::validate;

/// Application state shared across handlers
pub struct AppState {
    /// Issuer orchestrating accounts and the codec
    pub issuer: Issuer,
    /// Allowed CORS origins
    pub cors_origins: Vec<String>,
}
