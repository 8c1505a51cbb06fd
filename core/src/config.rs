//! Client configuration.
//!
//! # Design
//! There is no process-wide configuration. A `GraphConfig` is built by the
//! caller (directly, from TOML, or from the environment) and moved into a
//! `GraphClient`.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://graph.facebook.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Application credentials and defaults applied to every call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub base_url: String,
    #[serde(alias = "client_id")]
    pub app_id: Option<String>,
    #[serde(alias = "client_secret")]
    pub app_secret: Option<String>,
    /// User access token added to object, publish and remove calls.
    pub access_token: Option<String>,
    /// Application access token used for insights.
    pub app_access_token: Option<String>,
    /// Whole-request timeout. Files and the environment give it in seconds;
    /// zero disables it.
    #[serde(rename = "timeout_secs", deserialize_with = "deserialize_secs")]
    pub timeout: Duration,
}

fn deserialize_secs<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    u64::deserialize(deserializer).map(Duration::from_secs)
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            app_id: None,
            app_secret: None,
            access_token: None,
            app_access_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl GraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: GraphConfig = toml::from_str(s)?;
        Ok(config.normalized())
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Read `GRAPH_*` environment variables; unset ones keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = GraphConfig::default();
        if let Some(base_url) = lookup("GRAPH_BASE_URL") {
            config.base_url = base_url;
        }
        config.app_id = lookup("GRAPH_APP_ID");
        config.app_secret = lookup("GRAPH_APP_SECRET");
        config.access_token = lookup("GRAPH_ACCESS_TOKEN");
        config.app_access_token = lookup("GRAPH_APP_ACCESS_TOKEN");
        if let Some(timeout) = lookup("GRAPH_TIMEOUT_SECS") {
            let secs = timeout.parse().map_err(|_| ConfigError::InvalidValue {
                name: "GRAPH_TIMEOUT_SECS",
                value: timeout,
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config.normalized())
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self.normalized()
    }

    pub fn with_app(mut self, app_id: impl Into<String>, app_secret: impl Into<String>) -> Self {
        self.app_id = Some(app_id.into());
        self.app_secret = Some(app_secret.into());
        self
    }

    pub fn with_access_token(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = Some(access_token.into());
        self
    }

    pub fn with_app_access_token(mut self, app_access_token: impl Into<String>) -> Self {
        self.app_access_token = Some(app_access_token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn normalized(mut self) -> Self {
        let trimmed = self.base_url.trim_end_matches('/').len();
        self.base_url.truncate(trimmed);
        self
    }
}
