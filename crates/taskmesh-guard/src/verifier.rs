//! Credential verifier trait

use async_trait::async_trait;
use taskmesh_core::VerifiedIdentity;
use thiserror::Error;

/// Why a verifier could not produce an identity
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyFailure {
    /// The issuer could not be asked, or gave no usable answer
    #[error("issuer unavailable: {0}")]
    Unavailable(String),

    /// The issuer answered and the credential is not acceptable
    #[error("credential rejected: {0}")]
    Rejected(String),
}

/// Turns a presented token into a verified identity
///
/// Implementations must not cache: each call reflects the credential's
/// validity at the moment of the call.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Verify a bare token (no `Bearer ` prefix)
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, VerifyFailure>;

    /// Short description for logging
    fn description(&self) -> &str {
        "credential verifier"
    }
}
