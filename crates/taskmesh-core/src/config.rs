//! Environment-variable configuration helpers
//!
//! Every service reads its settings once at startup through [`Settings`].
//! The lookup is injectable so parsing rules can be tested without touching
//! the real process environment.

use std::collections::HashMap;
use std::str::FromStr;

use crate::error::ConfigError;

type Lookup<'a> = Box<dyn Fn(&str) -> Option<String> + 'a>;

/// A source of string settings
///
/// Empty or whitespace-only values are treated as unset.
pub struct Settings<'a> {
    lookup: Lookup<'a>,
}

impl Settings<'static> {
    /// Read from the process environment
    pub fn from_env() -> Self {
        Self {
            lookup: Box::new(|key| std::env::var(key).ok()),
        }
    }

    /// Read from a fixed set of pairs
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            lookup: Box::new(move |key| map.get(key).cloned()),
        }
    }
}

impl<'a> Settings<'a> {
    /// Read from an arbitrary lookup function
    pub fn from_fn(lookup: impl Fn(&str) -> Option<String> + 'a) -> Self {
        Self {
            lookup: Box::new(lookup),
        }
    }

    /// Raw value, `None` when unset or blank
    pub fn opt(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    /// Value or `default`
    pub fn or(&self, key: &str, default: &str) -> String {
        self.opt(key).unwrap_or_else(|| default.to_string())
    }

    /// Value that must be present
    pub fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.opt(key)
            .ok_or_else(|| ConfigError::Missing(key.to_string()))
    }

    /// Parsed value or `default`
    pub fn parse<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.opt(key) {
            Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                key: key.to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            }),
            None => Ok(default),
        }
    }

    /// Boolean flag; unset means `false`
    pub fn flag(&self, key: &str) -> Result<bool, ConfigError> {
        match self.opt(key) {
            Some(value) => parse_flag(key, &value),
            None => Ok(false),
        }
    }

    /// Comma-separated list or `default`
    pub fn list(&self, key: &str, default: &str) -> Vec<String> {
        parse_list(&self.or(key, default))
    }
}

/// Parse a boolean flag value
///
/// Accepts `1/0`, `true/false`, `yes/no`, `on/off` in any case.
pub fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key: key.to_string(),
            value: value.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}

/// Split a comma-separated list, trimming entries and dropping empty ones
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
