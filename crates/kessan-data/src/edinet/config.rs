//! Client configuration.

use std::time::Duration;

/// Production EDINET API host.
pub const DEFAULT_BASE_URL: &str = "https://api.edinet-fsa.go.jp";

/// Minimum spacing between two requests.
pub const DEFAULT_REQUEST_INTERVAL: Duration = Duration::from_secs(1);

/// Default per-request timeout. Archives can run to several megabytes.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Environment variable holding the subscription key.
pub const API_KEY_ENV: &str = "EDINET_API_KEY";

/// Environment variable overriding the API host.
pub const BASE_URL_ENV: &str = "EDINET_BASE_URL";

/// Settings for [`super::EdinetClient`].
#[derive(Clone, PartialEq, Eq)]
pub struct EdinetConfig {
    /// EDINET subscription key. Requests without one are rejected by the
    /// production API.
    pub api_key: Option<String>,
    /// Scheme and host, without a trailing path
    pub base_url: String,
    /// Minimum spacing between requests
    pub min_request_interval: Duration,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for EdinetConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            min_request_interval: DEFAULT_REQUEST_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl EdinetConfig {
    /// Default settings with the given subscription key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Default settings, with the key and host taken from `EDINET_API_KEY`
    /// and `EDINET_BASE_URL` when set and non-empty.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        let mut config = Self {
            api_key: var(API_KEY_ENV),
            ..Self::default()
        };
        if let Some(base_url) = var(BASE_URL_ENV) {
            config.base_url = base_url;
        }
        config
    }

    /// Replaces the minimum request spacing.
    pub const fn with_request_interval(mut self, interval: Duration) -> Self {
        self.min_request_interval = interval;
        self
    }
}

// Keeps the subscription key out of logs.
impl std::fmt::Debug for EdinetConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EdinetConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("min_request_interval", &self.min_request_interval)
            .field("timeout", &self.timeout)
            .finish()
    }
}
