//! Client configuration
//!
//! Connection settings and the polling policy. The defaults reproduce the
//! worker's reference client: a 5 second request timeout, a 30 second
//! long-poll timeout, unbounded retries on poll timeouts and silent
//! termination on poll errors.

use std::fmt;
use std::time::Duration;

use crate::error::{ClientError, Result};

/// Public OpenPixels worker endpoint
pub const DEFAULT_BASE_URL: &str = "https://worker.openpixels.ai";

/// Client configuration
#[derive(Clone)]
pub struct ClientConfig {
    /// Worker base URL (e.g., "https://worker.openpixels.ai")
    pub base_url: String,

    /// API key, sent as `Authorization: Key <api_key>`
    pub api_key: String,

    /// Timeout for every request that does not override it
    pub default_timeout: Duration,

    /// Timeout for each long-poll request; must exceed `default_timeout`
    pub poll_timeout: Duration,

    /// Report a non-success poll response as an error instead of ending the
    /// subscription silently
    pub surface_poll_errors: bool,

    /// Give up after this many consecutive poll timeouts (`None` retries forever)
    pub max_poll_timeouts: Option<u32>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            default_timeout: Duration::from_secs(5),
            poll_timeout: Duration::from_secs(30),
            surface_poll_errors: false,
            max_poll_timeouts: None,
        }
    }
}

// Keeps the API key out of logs.
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("default_timeout", &self.default_timeout)
            .field("poll_timeout", &self.poll_timeout)
            .field("surface_poll_errors", &self.surface_poll_errors)
            .field("max_poll_timeouts", &self.max_poll_timeouts)
            .finish()
    }
}

impl ClientConfig {
    /// Creates a configuration for the public worker with defaults
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - OPENPIXELS_API_KEY (required)
    /// - OPENPIXELS_BASE_URL (optional, default: https://worker.openpixels.ai)
    /// - OPENPIXELS_TIMEOUT_SECS (optional, seconds, default: 5)
    /// - OPENPIXELS_POLL_TIMEOUT_SECS (optional, seconds, default: 30)
    /// - OPENPIXELS_SURFACE_POLL_ERRORS (optional, "true"/"1", default: false)
    /// - OPENPIXELS_MAX_POLL_TIMEOUTS (optional, default: unbounded)
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let api_key = var("OPENPIXELS_API_KEY").ok_or_else(|| {
            ClientError::Config("OPENPIXELS_API_KEY environment variable not set".to_string())
        })?;

        let base_url = var("OPENPIXELS_BASE_URL").unwrap_or(defaults.base_url);

        let default_timeout = var("OPENPIXELS_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.default_timeout);

        let poll_timeout = var("OPENPIXELS_POLL_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.poll_timeout);

        let surface_poll_errors = var("OPENPIXELS_SURFACE_POLL_ERRORS")
            .map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(defaults.surface_poll_errors);

        let max_poll_timeouts = var("OPENPIXELS_MAX_POLL_TIMEOUTS")
            .and_then(|s| s.parse::<u32>().ok())
            .or(defaults.max_poll_timeouts);

        Ok(Self::new(api_key)
            .with_base_url(base_url)
            .with_timeouts(default_timeout, poll_timeout)
            .with_surface_poll_errors(surface_poll_errors)
            .with_max_poll_timeouts(max_poll_timeouts))
    }

    /// Points the client at another worker; a trailing `/` is dropped
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeouts(mut self, default_timeout: Duration, poll_timeout: Duration) -> Self {
        self.default_timeout = default_timeout;
        self.poll_timeout = poll_timeout;
        self
    }

    pub fn with_surface_poll_errors(mut self, surface: bool) -> Self {
        self.surface_poll_errors = surface;
        self
    }

    pub fn with_max_poll_timeouts(mut self, limit: Option<u32>) -> Self {
        self.max_poll_timeouts = limit;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(ClientError::Config("api_key cannot be empty".to_string()));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ClientError::Config(
                "base_url must start with http:// or https://".to_string(),
            ));
        }

        self.validate_polling()
    }

    /// Validates the timeouts and polling policy only
    ///
    /// Custom transports bring their own connection settings, but the poll
    /// loop still relies on these.
    pub fn validate_polling(&self) -> Result<()> {
        if self.default_timeout.is_zero() || self.poll_timeout.is_zero() {
            return Err(ClientError::Config("timeouts must be non-zero".to_string()));
        }

        if self.poll_timeout <= self.default_timeout {
            return Err(ClientError::Config(
                "poll_timeout must be longer than default_timeout".to_string(),
            ));
        }

        Ok(())
    }
}
