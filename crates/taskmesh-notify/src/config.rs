//! Notification service configuration

use std::time::Duration;

use taskmesh_core::{ConfigError, Settings};

/// Settings read at startup
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub webhook_timeout: Duration,
    pub log_level: String,
}

impl NotifyConfig {
    /// Read from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_settings(&Settings::from_env())
    }

    pub fn from_settings(settings: &Settings<'_>) -> Result<Self, ConfigError> {
        let timeout_secs: u64 = settings.parse("WEBHOOK_TIMEOUT_SECS", 10)?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "WEBHOOK_TIMEOUT_SECS".into(),
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }

        Ok(Self {
            port: settings.parse("PORT", 8082)?,
            cors_origins: settings.list("CORS_ORIGINS", "http://localhost:3000"),
            webhook_timeout: Duration::from_secs(timeout_secs),
            log_level: settings.or("LOG_LEVEL", "info"),
        })
    }
}
