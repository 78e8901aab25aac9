//! Remote verifier
//!
//! Delegates every check to the issuer's `GET /api/auth/validate` endpoint,
//! forwarding the token as a bearer credential.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use taskmesh_core::{VerifiedIdentity, VerifyResponse};
use tracing::debug;

use crate::verifier::{CredentialVerifier, VerifyFailure};

/// Upper bound on a single verification round trip
pub const DEFAULT_VERIFY_TIMEOUT: Duration = Duration::from_secs(5);

const VALIDATE_PATH: &str = "/api/auth/validate";

/// Verifies credentials by asking the issuer
pub struct RemoteVerifier {
    /// Full URL of the issuer's validate endpoint
    validate_url: String,
    /// Client with the verification timeout applied
    http_client: reqwest::Client,
    timeout: Duration,
}

impl RemoteVerifier {
    /// Create a verifier for the issuer at `issuer_url` with the 5s timeout
    pub fn new(issuer_url: &str) -> Result<Self, reqwest::Error> {
        Self::with_timeout(issuer_url, DEFAULT_VERIFY_TIMEOUT)
    }

    /// Create a verifier with a custom timeout
    pub fn with_timeout(issuer_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            validate_url: format!("{}{}", issuer_url.trim_end_matches('/'), VALIDATE_PATH),
            http_client,
            timeout,
        })
    }

    /// The endpoint this verifier calls
    pub fn validate_url(&self) -> &str {
        &self.validate_url
    }

    fn transport_failure(&self, err: reqwest::Error) -> VerifyFailure {
        if err.is_timeout() {
            VerifyFailure::Unavailable(format!("timed out after {:?}", self.timeout))
        } else {
            VerifyFailure::Unavailable(err.to_string())
        }
    }
}

#[async_trait]
impl CredentialVerifier for RemoteVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, VerifyFailure> {
        let response = self
            .http_client
            .get(&self.validate_url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| self.transport_failure(e))?;

        let status = response.status();
        debug!(url = %self.validate_url, status = %status, "Issuer answered verification");

        if status == StatusCode::UNAUTHORIZED {
            let reason = response
                .json::<VerifyResponse>()
                .await
                .ok()
                .and_then(|body| body.reason)
                .unwrap_or_else(|| "rejected by issuer".to_string());
            return Err(VerifyFailure::Rejected(reason));
        }

        if !status.is_success() {
            return Err(VerifyFailure::Unavailable(format!(
                "issuer returned {}",
                status
            )));
        }

        let body: VerifyResponse = response
            .json()
            .await
            .map_err(|e| VerifyFailure::Unavailable(format!("unreadable response: {}", e)))?;

        if !body.valid {
            return Err(VerifyFailure::Rejected(
                body.reason.unwrap_or_else(|| "invalid".to_string()),
            ));
        }

        body.into_identity().ok_or_else(|| {
            VerifyFailure::Unavailable("accepted response carried no identity".to_string())
        })
    }

    fn description(&self) -> &str {
        "remote issuer verifier"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        let verifier = RemoteVerifier::new("http://auth.internal:8080/").unwrap();
        assert_eq!(
            verifier.validate_url(),
            "http://auth.internal:8080/api/auth/validate"
        );
    }

    #[test]
    fn test_default_timeout_is_five_seconds() {
        assert_eq!(DEFAULT_VERIFY_TIMEOUT, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_unreachable_issuer_is_unavailable() {
        // Port 9 on loopback: nothing listens there in the test environment
        let verifier =
            RemoteVerifier::with_timeout("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();

        let result = verifier.verify("anything").await;
        assert!(matches!(result, Err(VerifyFailure::Unavailable(_))));
    }
}
