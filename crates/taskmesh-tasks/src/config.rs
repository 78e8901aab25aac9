//! Task service configuration

use taskmesh_core::{ConfigError, Settings};

/// How incoming credentials are checked
#[derive(Clone, PartialEq, Eq)]
pub enum AuthMode {
    /// Ask the issuer on every request
    Remote,
    /// Check in-process with the issuer's signing secret
    Local { jwt_secret: String },
}

impl std::fmt::Debug for AuthMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthMode::Remote => f.write_str("Remote"),
            AuthMode::Local { .. } => f.write_str("Local { jwt_secret: [redacted] }"),
        }
    }
}

/// Settings read at startup
#[derive(Debug, Clone)]
pub struct TaskServiceConfig {
    pub port: u16,
    pub auth_service_url: String,
    pub auth_mode: AuthMode,
    /// Unset means events are not forwarded
    pub notification_service_url: Option<String>,
    pub cors_origins: Vec<String>,
    pub log_level: String,
}

impl TaskServiceConfig {
    /// Read from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_settings(&Settings::from_env())
    }

    pub fn from_settings(settings: &Settings<'_>) -> Result<Self, ConfigError> {
        let auth_mode = match settings.or("AUTH_MODE", "remote").to_ascii_lowercase().as_str() {
            "remote" => AuthMode::Remote,
            "local" => AuthMode::Local {
                jwt_secret: settings.required("JWT_SECRET")?,
            },
            other => {
                return Err(ConfigError::Invalid {
                    key: "AUTH_MODE".into(),
                    value: other.to_string(),
                    reason: "expected `remote` or `local`".into(),
                })
            }
        };

        Ok(Self {
            port: settings.parse("PORT", 8081)?,
            auth_service_url: settings.or("AUTH_SERVICE_URL", "http://localhost:8080"),
            auth_mode,
            notification_service_url: settings.opt("NOTIFICATION_SERVICE_URL"),
            cors_origins: settings.list("CORS_ORIGINS", "http://localhost:3000"),
            log_level: settings.or("LOG_LEVEL", "info"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TaskServiceConfig::from_settings(&Settings::from_pairs(&[])).unwrap();

        assert_eq!(config.port, 8081);
        assert_eq!(config.auth_service_url, "http://localhost:8080");
        assert_eq!(config.auth_mode, AuthMode::Remote);
        assert_eq!(config.notification_service_url, None);
        assert_eq!(config.cors_origins, vec!["http://localhost:3000".to_string()]);
    }

    #[test]
    fn test_local_mode_needs_secret() {
        let err = TaskServiceConfig::from_settings(&Settings::from_pairs(&[("AUTH_MODE", "local")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::Missing("JWT_SECRET".into()));

        let config = TaskServiceConfig::from_settings(&Settings::from_pairs(&[
            ("AUTH_MODE", "Local"),
            ("JWT_SECRET", "hunter2"),
        ]))
        .unwrap();
        assert_eq!(
            config.auth_mode,
            AuthMode::Local {
                jwt_secret: "hunter2".into()
            }
        );
        assert!(!format!("{config:?}").contains("hunter2"));
    }

    #[test]
    fn test_unknown_mode_is_an_error() {
        let settings = Settings::from_pairs(&[("AUTH_MODE", "trust-me")]);
        assert!(matches!(
            TaskServiceConfig::from_settings(&settings),
            Err(ConfigError::Invalid { ref key, .. }) if key == "AUTH_MODE"
        ));
    }

    #[test]
    fn test_notification_url() {
        let settings = Settings::from_pairs(&[("NOTIFICATION_SERVICE_URL", "http://notify:8082")]);
        let config = TaskServiceConfig::from_settings(&settings).unwrap();
        assert_eq!(
            config.notification_service_url.as_deref(),
            Some("http://notify:8082")
        );
    }
}
