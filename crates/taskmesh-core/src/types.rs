//! Common types used across the taskmesh services
//!
//! Field names on the wire follow the original task-manager API
//! (`username`, `email`, `user_id`) so existing clients keep working.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque numeric subject identifier
pub type SubjectId = i64;

/// A registered principal
///
/// The secret verifier is not part of this type; it never
/// leaves the issuer's storage layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Unique, immutable identifier
    pub id: SubjectId,

    /// Unique human-readable handle
    #[serde(rename = "username")]
    pub handle: String,

    /// Unique contact address
    #[serde(rename = "email")]
    pub contact: String,

    /// When the subject registered
    pub created_at: DateTime<Utc>,
}

/// Identity extracted from an accepted credential
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VerifiedIdentity {
    #[serde(rename = "user_id")]
    pub subject_id: SubjectId,

    #[serde(rename = "username")]
    pub handle: String,
}

/// Body of the issuer's verification endpoint
///
/// `{"valid": true, "user_id": 1, "username": "alice"}` on success,
/// `{"valid": false, "reason": "expired"}` otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub valid: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<SubjectId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl VerifyResponse {
    /// Response for an accepted credential
    pub fn accepted(identity: VerifiedIdentity) -> Self {
        Self {
            valid: true,
            user_id: Some(identity.subject_id),
            username: Some(identity.handle),
            reason: None,
        }
    }

    /// Response for a rejected credential
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            user_id: None,
            username: None,
            reason: Some(reason.into()),
        }
    }

    /// The identity carried by an accepted response
    ///
    /// Returns `None` unless `valid` is set and both identity fields are present.
    pub fn into_identity(self) -> Option<VerifiedIdentity> {
        if !self.valid {
            return None;
        }
        match (self.user_id, self.username) {
            (Some(subject_id), Some(handle)) => Some(VerifiedIdentity { subject_id, handle }),
            _ => None,
        }
    }
}

/// Body POSTed to every webhook target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEnvelope {
    /// Event name, e.g. `task.created`
    pub event: String,

    /// Opaque event payload
    pub data: serde_json::Value,
}

impl WebhookEnvelope {
    pub fn new(event: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }
}
