//! Local verifier
//!
//! Checks credentials in-process with the issuer's signing secret. Used when
//! a resource service is deployed alongside the issuer and shares its secret.

use async_trait::async_trait;
use taskmesh_core::{CredentialCodec, VerifiedIdentity};

use crate::verifier::{CredentialVerifier, VerifyFailure};

/// Verifies credentials with a shared signing secret
pub struct LocalVerifier {
    codec: CredentialCodec,
}

impl LocalVerifier {
    pub fn new(codec: CredentialCodec) -> Self {
        Self { codec }
    }

    /// Build from the raw signing secret
    pub fn from_secret(secret: &[u8]) -> Self {
        Self::new(CredentialCodec::new(secret))
    }
}

#[async_trait]
impl CredentialVerifier for LocalVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, VerifyFailure> {
        self.codec
            .verify(token)
            .map_err(|e| VerifyFailure::Rejected(e.reason().to_string()))
    }

    fn description(&self) -> &str {
        "local shared-secret verifier"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_accepts_own_credential() {
        let codec = CredentialCodec::new(b"local-secret");
        let token = codec.issue(5, "carol").unwrap();
        let verifier = LocalVerifier::new(codec);

        let identity = verifier.verify(&token).await.unwrap();
        assert_eq!(identity.subject_id, 5);
        assert_eq!(identity.handle, "carol");
    }

    #[tokio::test]
    async fn test_rejects_with_reason() {
        let token = CredentialCodec::new(b"issuer-secret").issue(5, "carol").unwrap();
        let verifier = LocalVerifier::from_secret(b"different-secret");

        assert_eq!(
            verifier.verify(&token).await,
            Err(VerifyFailure::Rejected("bad-signature".into()))
        );
    }
}
