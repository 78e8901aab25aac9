//! Authorization middleware
//!
//! Extracts the bearer credential, verifies it, and binds the resulting
//! identity into the request extensions. Requests that fail any step are
//! answered with `401` and never reach the handler.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use taskmesh_core::VerifiedIdentity;
use tracing::{debug, warn};

use crate::error::GuardError;
use crate::verifier::{CredentialVerifier, VerifyFailure};

/// Middleware state: the verifier every protected request goes through
#[derive(Clone)]
pub struct Guard {
    verifier: Arc<dyn CredentialVerifier>,
}

impl Guard {
    pub fn new<V: CredentialVerifier + 'static>(verifier: V) -> Self {
        Self {
            verifier: Arc::new(verifier),
        }
    }

    pub fn verifier(&self) -> &dyn CredentialVerifier {
        self.verifier.as_ref()
    }
}

/// Identity of the caller, available to handlers behind the guard
///
/// Handlers take it as an extractor:
///
/// ```ignore
/// async fn list(AuthenticatedSubject(who): AuthenticatedSubject) -> ... { }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedSubject(pub VerifiedIdentity);

impl<S> FromRequestParts<S> for AuthenticatedSubject
where
    S: Send + Sync,
{
    type Rejection = GuardError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedSubject>()
            .cloned()
            .ok_or(GuardError::MissingCredential)
    }
}

/// Pull the token out of the `Authorization` header
///
/// The `Bearer` scheme prefix is optional. Returns `None` when the header is
/// absent, not valid ASCII, or carries no token.
pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();

    let token = match value.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        _ if value.eq_ignore_ascii_case("bearer") => "",
        _ => value,
    };

    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Verify the caller before running the wrapped handler
///
/// Install with [`axum::middleware::from_fn_with_state`] or [`protect`].
pub async fn require_identity(
    State(guard): State<Guard>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_bearer(request.headers()) else {
        debug!(path = %request.uri().path(), "Request without credential");
        return GuardError::MissingCredential.into_response();
    };

    match guard.verifier.verify(token).await {
        Ok(identity) => {
            debug!(
                user_id = identity.subject_id,
                username = %identity.handle,
                "Credential accepted"
            );
            request
                .extensions_mut()
                .insert(AuthenticatedSubject(identity));
            next.run(request).await
        }
        Err(VerifyFailure::Unavailable(reason)) => {
            warn!(
                verifier = guard.verifier.description(),
                reason = %reason,
                "Issuer unavailable, failing closed"
            );
            GuardError::InvalidCredential.into_response()
        }
        Err(VerifyFailure::Rejected(reason)) => {
            warn!(
                path = %request.uri().path(),
                reason = %reason,
                "Credential rejected"
            );
            GuardError::InvalidCredential.into_response()
        }
    }
}

/// Put every route currently on `router` behind the guard
///
/// Routes added after this call are not protected, which is how `/health`
/// stays open.
pub fn protect<S>(router: Router<S>, guard: Guard) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.route_layer(middleware::from_fn_with_state(guard, require_identity))
}
