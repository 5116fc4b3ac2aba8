//! Environment driven configuration
//!
//! [`ConfigService`] is a key/value view over the process environment (plus
//! whatever `.env` loaded into it); [`AppConfig`] is the typed configuration
//! the server is built from.

use dashmap::DashMap;
use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub const PORT: &str = "PORT";
pub const MONGO_URI: &str = "MONGO_URI";
pub const NODE_ENV: &str = "NODE_ENV";
pub const REQUEST_TIMEOUT_SECS: &str = "REQUEST_TIMEOUT_SECS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Configuration service
#[derive(Clone, Default)]
pub struct ConfigService {
    config: Arc<DashMap<String, String>>,
}

impl ConfigService {
    /// Snapshot the current process environment
    pub fn from_env() -> Self {
        let service = Self::default();
        // non-unicode entries cannot hold any key we read
        for (key, value) in env::vars_os() {
            if let (Some(key), Some(value)) = (key.to_str(), value.to_str()) {
                service.set(key, value);
            }
        }
        service
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.config.get(key).map(|v| v.clone())
    }

    pub fn set(&self, key: &str, value: &str) {
        self.config.insert(key.to_owned(), value.to_owned());
    }

    /// Like [`get`](Self::get) but treats blank values as unset
    pub fn get_non_empty(&self, key: &str) -> Option<String> {
        self.get(key)
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
    }
}

/// Which deployment profile the process runs under
///
/// Read from `NODE_ENV`; only `production` hides diagnostic detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    #[default]
    Development,
    Test,
    Production,
}

impl RunMode {
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("production") => RunMode::Production,
            Some("test") => RunMode::Test,
            _ => RunMode::Development,
        }
    }

    pub fn is_production(self) -> bool {
        self == RunMode::Production
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RunMode::Development => "development",
            RunMode::Test => "test",
            RunMode::Production => "production",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed server configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Left unset when `MONGO_URI` is missing; connecting then fails fatally
    pub mongo_uri: Option<String>,
    pub mode: RunMode,
    pub request_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            mongo_uri: None,
            mode: RunMode::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_service(&ConfigService::from_env())
    }

    pub fn from_service(config: &ConfigService) -> Result<Self, ConfigError> {
        let port = match config.get_non_empty(PORT) {
            Some(value) => value.parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                key: PORT,
                value: value.clone(),
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let request_timeout = match config.get_non_empty(REQUEST_TIMEOUT_SECS) {
            Some(value) => parse_timeout(&value)?,
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        Ok(Self {
            port,
            mongo_uri: config.get_non_empty(MONGO_URI),
            mode: RunMode::from_env_value(config.get(NODE_ENV).as_deref()),
            request_timeout,
        })
    }
}

fn parse_timeout(value: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidValue {
        key: REQUEST_TIMEOUT_SECS,
        value: value.to_owned(),
        reason,
    };

    let secs = value.parse::<u64>().map_err(|e| invalid(e.to_string()))?;
    if secs == 0 {
        return Err(invalid("must be at least 1 second".to_owned()));
    }
    Ok(Duration::from_secs(secs))
}
