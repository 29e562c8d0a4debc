//! Client configuration.
//!
//! # Design
//! `ClientConfig` is built once and shared read-only by every call. Loading
//! from JSON or the environment validates the result; `ClientConfig::new`
//! does not, so tests can build deliberately incomplete configs.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default connect and read timeout, in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Environment variable prefix used by `ClientConfig::from_env`.
pub const ENV_PREFIX: &str = "OVH_API_";

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Credentials, endpoint and timeouts for an `OvhClient`.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// Endpoint alias such as `ovh-eu`, or a literal base URL.
    pub endpoint: String,
    pub application_key: String,
    pub application_secret: String,
    pub consumer_key: String,
    #[serde(rename = "connectTimeout", default = "default_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(rename = "readTimeout", default = "default_timeout_ms")]
    pub read_timeout_ms: u64,
}

impl ClientConfig {
    pub fn new(
        endpoint: impl Into<String>,
        application_key: impl Into<String>,
        application_secret: impl Into<String>,
        consumer_key: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            application_key: application_key.into(),
            application_secret: application_secret.into(),
            consumer_key: consumer_key.into(),
            connect_timeout_ms: DEFAULT_TIMEOUT_MS,
            read_timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_timeouts(mut self, connect: Duration, read: Duration) -> Self {
        self.connect_timeout_ms = connect.as_millis().try_into().unwrap_or(u64::MAX);
        self.read_timeout_ms = read.as_millis().try_into().unwrap_or(u64::MAX);
        self
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Parse and validate a JSON document with camelCase keys.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: ClientConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `OVH_API_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup using the `OVH_API_*` names.
    ///
    /// Missing string fields load as empty and then fail validation. Missing
    /// timeouts fall back to `DEFAULT_TIMEOUT_MS`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));
        let timeout = |name: &str, field: &'static str| -> Result<u64, ConfigError> {
            match var(name) {
                None => Ok(DEFAULT_TIMEOUT_MS),
                Some(value) => value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidTimeout { field, value }),
            }
        };

        let config = Self {
            endpoint: var("ENDPOINT").unwrap_or_default(),
            application_key: var("APPLICATION_KEY").unwrap_or_default(),
            application_secret: var("APPLICATION_SECRET").unwrap_or_default(),
            consumer_key: var("CONSUMER_KEY").unwrap_or_default(),
            connect_timeout_ms: timeout("CONNECT_TIMEOUT", "connectTimeout")?,
            read_timeout_ms: timeout("READ_TIMEOUT", "readTimeout")?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject configs with an empty or whitespace-only string field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("endpoint", &self.endpoint),
            ("applicationKey", &self.application_key),
            ("applicationSecret", &self.application_secret),
            ("consumerKey", &self.consumer_key),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(ConfigError::Blank(name));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("application_key", &self.application_key)
            .field("application_secret", &"<redacted>")
            .field("consumer_key", &"<redacted>")
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .field("read_timeout_ms", &self.read_timeout_ms)
            .finish()
    }
}
