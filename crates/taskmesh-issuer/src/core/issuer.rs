//! Issuer service
//!
//! Ties the credential store to the codec. The signing secret lives inside
//! the codec and is never exposed by this type.

use serde::Serialize;
use taskmesh_core::{CodecError, CredentialCodec, Subject, VerificationError, VerifiedIdentity};
use thiserror::Error;
use tracing::{info, warn};

use crate::accounts::{AccountError, CredentialStore};

/// Errors from issuer operations
#[derive(Error, Debug)]
pub enum IssuerError {
    #[error(transparent)]
    Account(#[from] AccountError),

    #[error("Invalid token: {0}")]
    Credential(#[from] VerificationError),

    #[error(transparent)]
    Signing(#[from] CodecError),
}

/// A freshly minted credential and the subject it names
#[derive(Debug, Clone, Serialize)]
pub struct IssuedCredential {
    pub token: String,
    #[serde(rename = "user")]
    pub subject: Subject,
}

/// Issues and verifies credentials for registered subjects
#[derive(Debug, Clone)]
pub struct Issuer {
    accounts: CredentialStore,
    codec: CredentialCodec,
}

impl Issuer {
    pub fn new(accounts: CredentialStore, codec: CredentialCodec) -> Self {
        Self { accounts, codec }
    }

    /// Authenticate and mint a credential
    pub async fn login(&self, handle: &str, passphrase: &str) -> Result<IssuedCredential, IssuerError> {
        let subject = self.accounts.authenticate(handle, passphrase).await?;
        let token = self.codec.issue(subject.id, &subject.handle)?;

        info!(user_id = subject.id, username = %subject.handle, "Issued credential on login");
        Ok(IssuedCredential { token, subject })
    }

    /// Create a subject and mint its first credential
    ///
    /// The subject stays registered even if signing then fails.
    pub async fn register(
        &self,
        handle: &str,
        contact: &str,
        passphrase: &str,
    ) -> Result<IssuedCredential, IssuerError> {
        let subject = self.accounts.register(handle, contact, passphrase).await?;
        let token = self.codec.issue(subject.id, &subject.handle)?;

        info!(user_id = subject.id, username = %subject.handle, "Issued credential on registration");
        Ok(IssuedCredential { token, subject })
    }

    /// Check a presented credential
    pub fn verify_presented(&self, token: &str) -> Result<VerifiedIdentity, VerificationError> {
        self.codec.verify(token).inspect_err(|e| {
            warn!(reason = e.reason(), "Presented credential rejected");
        })
    }

    /// Verify a credential and return the subject's current record
    pub async fn resolve_identity(&self, token: &str) -> Result<Subject, IssuerError> {
        let identity = self.verify_presented(token)?;
        Ok(self.accounts.lookup(identity.subject_id).await?)
    }
}
