use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Default API location used by the local development backend.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Environment variable overriding [`ClientSettings::base_url`].
pub const ENV_BASE_URL: &str = "NETWORTH_API_URL";

/// Environment variable overriding [`ClientSettings::timeout_secs`].
pub const ENV_TIMEOUT_SECS: &str = "NETWORTH_API_TIMEOUT_SECS";

/// Connection settings for the dashboard API client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Base URL including the `/api` prefix (e.g., "http://localhost:8000/api").
    pub base_url: String,

    /// Per-request timeout. Ignored on wasm32, where the browser owns timeouts.
    pub timeout_secs: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl ClientSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Defaults overridden by `NETWORTH_API_URL` / `NETWORTH_API_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, CoreError> {
        let mut settings = Self::default();
        if let Ok(url) = std::env::var(ENV_BASE_URL) {
            settings.base_url = url;
        }
        if let Ok(raw) = std::env::var(ENV_TIMEOUT_SECS) {
            settings.timeout_secs = raw.trim().parse().map_err(|_| {
                CoreError::Config(format!("{ENV_TIMEOUT_SECS} must be a whole number of seconds, got '{raw}'"))
            })?;
        }
        settings.validate()?;
        Ok(settings)
    }

    /// Base URL must be an absolute http(s) URL and the timeout non-zero.
    pub fn validate(&self) -> Result<(), CoreError> {
        let url = reqwest::Url::parse(self.base_url.trim())
            .map_err(|e| CoreError::Config(format!("Invalid base URL '{}': {e}", self.base_url)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(CoreError::Config(format!(
                "Base URL '{}' must use http or https",
                self.base_url
            )));
        }
        if url.cannot_be_a_base() {
            return Err(CoreError::Config(format!(
                "Base URL '{}' cannot carry a path",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(CoreError::Config("Timeout must be at least 1 second".into()));
        }
        Ok(())
    }
}
