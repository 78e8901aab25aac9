//! Error types shared across taskmesh crates

use thiserror::Error;

/// Why a presented credential was not accepted
///
/// The variants are ordered by the point at which verification gives up:
/// parsing, then the validity window, then the signature.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerificationError {
    /// The token could not be parsed as a credential
    #[error("credential is malformed")]
    Malformed,

    /// The signature does not verify under the signing secret
    #[error("credential signature is invalid")]
    BadSignature,

    /// `now >= exp`
    #[error("credential has expired")]
    Expired,

    /// `now < nbf`
    #[error("credential is not yet valid")]
    NotYetValid,
}

impl VerificationError {
    /// Stable, machine-readable reason string used on the wire
    pub fn reason(&self) -> &'static str {
        match self {
            VerificationError::Malformed => "malformed",
            VerificationError::BadSignature => "bad-signature",
            VerificationError::Expired => "expired",
            VerificationError::NotYetValid => "not-yet-valid",
        }
    }
}

/// Errors raised while minting a credential
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("failed to sign credential: {0}")]
    Signing(String),
}

/// Errors raised while reading service configuration at startup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    Missing(String),

    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },
}
