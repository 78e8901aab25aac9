//! Credential codec
//!
//! Credentials are JWTs in compact serialization, signed with HMAC-SHA256
//! under a single process-wide secret. The claim set is
//! `{user_id, username, iat, nbf, exp}` with timestamps in Unix seconds.
//!
//! Verification runs in three stages and stops at the first failure:
//!
//! 1. parse the header and claims (`Malformed`)
//! 2. check the validity window `[nbf, exp)` (`NotYetValid` / `Expired`)
//! 3. check the signature (`BadSignature`)
//!
//! The window is checked before the signature, so a token past its expiry is
//! always reported as `Expired` whether or not its signature is intact.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use crate::error::{CodecError, VerificationError};
use crate::types::{SubjectId, VerifiedIdentity};

/// Lifetime of an issued credential
pub const DEFAULT_CREDENTIAL_TTL_HOURS: i64 = 24;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Claim set carried by a credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject identifier
    pub user_id: SubjectId,
    /// Subject handle at issuance time
    pub username: String,
    /// Issued at
    pub iat: i64,
    /// Not before
    pub nbf: i64,
    /// Expires at (exclusive)
    pub exp: i64,
}

/// Issues and verifies credentials under one signing secret
#[derive(Clone)]
pub struct CredentialCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for CredentialCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialCodec")
            .field("algorithm", &ALGORITHM)
            .field("ttl", &self.ttl)
            .field("secret", &"[redacted]")
            .finish()
    }
}

impl CredentialCodec {
    /// Create a codec for the given signing secret with the default 24h lifetime
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl: Duration::hours(DEFAULT_CREDENTIAL_TTL_HOURS),
        }
    }

    /// Mint a credential valid from now for the configured lifetime
    pub fn issue(&self, subject_id: SubjectId, handle: &str) -> Result<String, CodecError> {
        self.issue_at(subject_id, handle, Utc::now())
    }

    /// Mint a credential as if the current time were `now`
    pub fn issue_at(
        &self,
        subject_id: SubjectId,
        handle: &str,
        now: DateTime<Utc>,
    ) -> Result<String, CodecError> {
        let issued = now.timestamp();
        let claims = Claims {
            user_id: subject_id,
            username: handle.to_string(),
            iat: issued,
            nbf: issued,
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| CodecError::Signing(e.to_string()))
    }

    /// Verify a credential against the current time
    pub fn verify(&self, token: &str) -> Result<VerifiedIdentity, VerificationError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a credential as if the current time were `now`
    pub fn verify_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<VerifiedIdentity, VerificationError> {
        if token.is_empty() {
            return Err(VerificationError::Malformed);
        }

        let claims = read_claims(token)?;
        check_window(&claims, now.timestamp())?;

        let verified = decode::<Claims>(token, &self.decoding_key, &signed_validation())
            .map_err(|e| classify(e.kind()))?;

        Ok(VerifiedIdentity {
            subject_id: verified.claims.user_id,
            handle: verified.claims.username,
        })
    }
}

/// Validation that only checks the signature; the window is checked by hand
fn signed_validation() -> Validation {
    let mut validation = Validation::new(ALGORITHM);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.leeway = 0;
    validation.required_spec_claims = HashSet::new();
    validation
}

/// Parse the claim set without looking at the signature
fn read_claims(token: &str) -> Result<Claims, VerificationError> {
    let mut validation = signed_validation();
    validation.insecure_disable_signature_validation();

    decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|_| VerificationError::Malformed)
}

fn check_window(claims: &Claims, now: i64) -> Result<(), VerificationError> {
    if now >= claims.exp {
        return Err(VerificationError::Expired);
    }
    if now < claims.nbf {
        return Err(VerificationError::NotYetValid);
    }
    Ok(())
}

fn classify(kind: &ErrorKind) -> VerificationError {
    match kind {
        ErrorKind::InvalidSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::InvalidAlgorithmName => VerificationError::BadSignature,
        ErrorKind::ExpiredSignature => VerificationError::Expired,
        ErrorKind::ImmatureSignature => VerificationError::NotYetValid,
        _ => VerificationError::Malformed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"unit-test-signing-secret";

    fn codec() -> CredentialCodec {
        CredentialCodec::new(SECRET)
    }

    fn at(ts: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(ts, 0).unwrap()
    }

    #[test]
    fn test_issue_then_verify() {
        let token = codec().issue(42, "alice").unwrap();
        let identity = codec().verify(&token).unwrap();

        assert_eq!(identity.subject_id, 42);
        assert_eq!(identity.handle, "alice");
    }

    #[test]
    fn test_claims_window_is_24_hours() {
        let now = at(1_700_000_000);
        let token = codec().issue_at(1, "alice", now).unwrap();
        let claims = read_claims(&token).unwrap();

        assert_eq!(claims.iat, 1_700_000_000);
        assert_eq!(claims.nbf, claims.iat);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let issued = at(1_700_000_000);
        let token = codec().issue_at(1, "alice", issued).unwrap();
        let exp = issued + Duration::hours(24);

        assert!(codec().verify_at(&token, exp - Duration::seconds(1)).is_ok());
        assert_eq!(
            codec().verify_at(&token, exp),
            Err(VerificationError::Expired)
        );
    }

    #[test]
    fn test_not_yet_valid() {
        let issued = at(1_700_000_000);
        let token = codec().issue_at(1, "alice", issued).unwrap();

        assert_eq!(
            codec().verify_at(&token, issued - Duration::seconds(1)),
            Err(VerificationError::NotYetValid)
        );
    }

    #[test]
    fn test_wrong_secret_is_bad_signature() {
        let token = codec().issue(1, "alice").unwrap();
        let other = CredentialCodec::new(b"some-other-secret");

        assert_eq!(other.verify(&token), Err(VerificationError::BadSignature));
    }

    #[test]
    fn test_expired_wins_over_bad_signature() {
        let issued = at(1_700_000_000);
        let token = codec().issue_at(1, "alice", issued).unwrap();
        let other = CredentialCodec::new(b"some-other-secret");

        assert_eq!(
            other.verify_at(&token, issued + Duration::days(2)),
            Err(VerificationError::Expired)
        );
    }

    #[test]
    fn test_garbage_is_malformed() {
        for token in ["", "not-a-jwt", "a.b", "a.b.c", "....."] {
            assert_eq!(
                codec().verify(token),
                Err(VerificationError::Malformed),
                "token {token:?}"
            );
        }
    }

    #[test]
    fn test_other_algorithm_is_rejected() {
        let claims = Claims {
            user_id: 1,
            username: "alice".into(),
            iat: Utc::now().timestamp(),
            nbf: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 60,
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert_eq!(codec().verify(&token), Err(VerificationError::BadSignature));
    }

    #[test]
    fn test_tampered_payload_is_bad_signature() {
        let token = codec().issue(1, "alice").unwrap();
        let forged = codec().issue(2, "mallory").unwrap();

        let parts: Vec<&str> = token.split('.').collect();
        let forged_parts: Vec<&str> = forged.split('.').collect();
        let spliced = format!("{}.{}.{}", parts[0], forged_parts[1], parts[2]);

        assert_eq!(
            codec().verify(&spliced),
            Err(VerificationError::BadSignature)
        );
    }

    #[test]
    fn test_debug_redacts_secret() {
        let rendered = format!("{:?}", codec());
        assert!(rendered.contains("[redacted]"));
        assert!(!rendered.contains("unit-test-signing-secret"));
    }
}
