//! Plumbing shared by every taskmesh binary: health body, CORS, logging

use axum::http::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

/// Build the health body for `service`
pub fn health_response(service: &str, version: &str) -> HealthResponse {
    HealthResponse {
        status: "healthy".into(),
        service: service.into(),
        version: version.into(),
        timestamp: Utc::now(),
    }
}

/// CORS layer for the configured origins
///
/// `*` anywhere in the list allows any origin, without credentials.
/// Otherwise only the listed origins are allowed, with credentials.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let base = CorsLayer::new()
        .allow_methods(methods)
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    if origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    base.allow_origin(allowed).allow_credentials(true)
}

/// Install the global `tracing` subscriber
///
/// `level` is an env-filter directive such as `info` or
/// `debug,tower_http=info`; anything unparseable falls back to `info`.
pub fn init_tracing(level: &str) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_body() {
        let health = health_response("auth-service", "1.2.3");
        let value = serde_json::to_value(&health).unwrap();

        assert_eq!(value["status"], "healthy");
        assert_eq!(value["service"], "auth-service");
        assert_eq!(value["version"], "1.2.3");
        assert!(value["timestamp"].is_string());
    }

    async fn preflight(origins: &[&str], origin: &str) -> axum::http::HeaderMap {
        use axum::{body::Body, extract::Request, response::Response};
        use tower::{Layer, ServiceExt};

        let origins: Vec<String> = origins.iter().map(|o| o.to_string()).collect();
        let inner = tower::service_fn(|_req: Request| async {
            Ok::<_, std::convert::Infallible>(Response::new(Body::empty()))
        });

        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/tasks")
            .header("origin", origin)
            .header("access-control-request-method", "POST")
            .body(Body::empty())
            .unwrap();

        cors_layer(&origins)
            .layer(inner)
            .oneshot(request)
            .await
            .unwrap()
            .headers()
            .clone()
    }

    #[tokio::test]
    async fn test_wildcard_allows_any_origin_without_credentials() {
        let headers = preflight(&["*"], "http://anywhere.test").await;

        assert_eq!(headers["access-control-allow-origin"], "*");
        assert!(headers.get("access-control-allow-credentials").is_none());
    }

    #[tokio::test]
    async fn test_listed_origin_allows_credentials() {
        let origins = ["http://localhost:3000", "not a header\nvalue"];

        let headers = preflight(&origins, "http://localhost:3000").await;
        assert_eq!(headers["access-control-allow-origin"], "http://localhost:3000");
        assert_eq!(headers["access-control-allow-credentials"], "true");
        let methods = headers["access-control-allow-methods"].to_str().unwrap();
        assert!(methods.contains("DELETE"));

        let other = preflight(&origins, "http://evil.test").await;
        assert!(other.get("access-control-allow-origin").is_none());
    }
}
