//! Issuer configuration

use taskmesh_core::{ConfigError, Settings};

/// Signing secret used when `DEV_MODE` is on and `JWT_SECRET` is unset
pub const DEV_JWT_SECRET: &str = "taskmesh-dev-secret-do-not-use-in-production";

/// Settings read at startup
#[derive(Clone)]
pub struct IssuerConfig {
    pub port: u16,
    /// Unset means in-memory storage
    pub database_url: Option<String>,
    pub jwt_secret: String,
    /// `true` when the secret came from [`DEV_JWT_SECRET`]
    pub using_dev_secret: bool,
    pub cors_origins: Vec<String>,
    pub dev_mode: bool,
    pub log_level: String,
}

impl std::fmt::Debug for IssuerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuerConfig")
            .field("port", &self.port)
            .field("database_url", &self.database_url)
            .field("jwt_secret", &"[redacted]")
            .field("using_dev_secret", &self.using_dev_secret)
            .field("cors_origins", &self.cors_origins)
            .field("dev_mode", &self.dev_mode)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl IssuerConfig {
    /// Read from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_settings(&Settings::from_env())
    }

    pub fn from_settings(settings: &Settings<'_>) -> Result<Self, ConfigError> {
        let dev_mode = settings.flag("DEV_MODE")?;

        let (jwt_secret, using_dev_secret) = match settings.opt("JWT_SECRET") {
            Some(secret) => (secret, false),
            None if dev_mode => (DEV_JWT_SECRET.to_string(), true),
            None => return Err(ConfigError::Missing("JWT_SECRET".into())),
        };

        Ok(Self {
            port: settings.parse("PORT", 8080)?,
            database_url: settings.opt("DATABASE_URL"),
            jwt_secret,
            using_dev_secret,
            cors_origins: settings.list("CORS_ORIGINS", "http://localhost:3000"),
            dev_mode,
            log_level: settings.or("LOG_LEVEL", "info"),
        })
    }
}
