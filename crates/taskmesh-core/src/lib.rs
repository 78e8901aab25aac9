//! # Taskmesh Core
//!
//! Types and primitives shared by every taskmesh service.
//!
//! ## Key Concepts
//!
//! - **Subject**: a registered principal that can authenticate with the issuer
//! - **Credential**: an HS256-signed, time-bounded assertion of a subject's identity
//! - **Verified identity**: what a resource service learns about the caller once
//!   a credential has been accepted
//! - **Webhook envelope**: the `{event, data}` body delivered to subscribers
//!
//! ## Credential Validity
//!
//! A credential is valid only when its signature verifies under the issuer's
//! signing secret **and** the current time lies in `[nbf, exp)`. There is no
//! revocation: expiry is the only way a credential stops being accepted.

pub mod config;
pub mod credential;
pub mod error;
pub mod types;

pub use config::Settings;
pub use credential::{Claims, CredentialCodec, DEFAULT_CREDENTIAL_TTL_HOURS};
pub use error::{CodecError, ConfigError, VerificationError};
pub use types::{Subject, SubjectId, VerifiedIdentity, VerifyResponse, WebhookEnvelope};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
