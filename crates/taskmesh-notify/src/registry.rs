//! Subscription registry
//!
//! In-memory mapping from event name to delivery targets. Registrations live
//! for the process lifetime and are never removed. Subscribing the same pair
//! twice keeps both entries, so that target receives each event twice.

use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};

use reqwest::Url;
use thiserror::Error;
use tracing::info;

/// Why a subscription was refused
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    #[error("Event and URL are required")]
    MissingField,

    #[error("Invalid target URL {url:?}: {reason}")]
    InvalidTarget { url: String, reason: String },
}

/// Event name to ordered list of target URLs
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    subscriptions: RwLock<HashMap<String, Vec<String>>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `target` for `event`
    ///
    /// The target must be an absolute `http` or `https` URL.
    pub fn subscribe(&self, event: &str, target: &str) -> Result<(), SubscriptionError> {
        let event = event.trim();
        let target = target.trim();
        if event.is_empty() || target.is_empty() {
            return Err(SubscriptionError::MissingField);
        }
        validate_target(target)?;

        // The map holds plain data, so a poisoned lock is still consistent
        let mut subscriptions = self
            .subscriptions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        subscriptions
            .entry(event.to_string())
            .or_default()
            .push(target.to_string());

        info!(event = %event, url = %target, "Registered webhook");
        Ok(())
    }

    /// Targets registered for `event`, in registration order
    ///
    /// The name is trimmed the same way [`subscribe`](Self::subscribe) trims it.
    pub fn targets_for(&self, event: &str) -> Vec<String> {
        self.subscriptions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(event.trim())
            .cloned()
            .unwrap_or_default()
    }

    /// Every subscription, keyed by event name
    pub fn snapshot(&self) -> BTreeMap<String, Vec<String>> {
        self.subscriptions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(event, targets)| (event.clone(), targets.clone()))
            .collect()
    }
}

fn validate_target(target: &str) -> Result<(), SubscriptionError> {
    let invalid = |reason: &str| SubscriptionError::InvalidTarget {
        url: target.to_string(),
        reason: reason.to_string(),
    };

    let url = Url::parse(target).map_err(|e| invalid(&e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(invalid("scheme must be http or https")),
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host"));
    }
    Ok(())
}
