//! Taskmesh Guard
//!
//! Everything a resource service needs to accept only callers holding a
//! credential minted by the issuer.
//!
//! ## Architecture
//!
//! The guard holds one [`CredentialVerifier`] and runs it on every request
//! that reaches a protected route:
//!
//! - **Remote**: asks the issuer's `GET /api/auth/validate` endpoint, with a
//!   5 second timeout. This is the default.
//! - **Local**: checks the credential in-process with the shared signing
//!   secret. Same contract, no network hop.
//!
//! Any failure short-circuits with `401` before the handler runs. Results are
//! never cached: every request is verified.
//!
//! ## Usage
//!
//! ```ignore
//! use taskmesh_guard::{protect, Guard, RemoteVerifier};
//!
//! let guard = Guard::new(RemoteVerifier::new("http://localhost:8080")?);
//! let app = protect(task_routes, guard).route("/health", get(health));
//! ```

pub mod error;
pub mod middleware;
pub mod service;
pub mod verifier;
pub mod verifiers;

pub use error::GuardError;
pub use middleware::{extract_bearer, protect, require_identity, AuthenticatedSubject, Guard};
pub use service::{cors_layer, health_response, init_tracing, HealthResponse};
pub use verifier::{CredentialVerifier, VerifyFailure};
pub use verifiers::{LocalVerifier, RemoteVerifier, DEFAULT_VERIFY_TIMEOUT};
