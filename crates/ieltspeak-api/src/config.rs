//! Public configuration for the practice API client.

use std::time::Duration;

/// Default base URL of the practice service.
pub const DEFAULT_BASE_URL: &str = "http://localhost:4300/api/v1";

/// Configuration for the practice API client.
///
/// Use the builder methods to customize the client.
///
/// ```
/// use ieltspeak_api::PracticeApiConfig;
/// use std::time::Duration;
///
/// let config = PracticeApiConfig::new()
///     .with_base_url("https://practice.example.com/api/v1")
///     .with_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct PracticeApiConfig {
    /// Base URL; endpoint paths are appended to it
    pub(crate) base_url: String,
    /// User agent string for HTTP requests
    pub(crate) user_agent: String,
    /// Request timeout
    pub(crate) timeout: Duration,
    /// Maximum number of retry attempts for transient errors
    pub(crate) max_retries: u8,
    /// Base delay for exponential backoff
    pub(crate) retry_base_delay: Duration,
    /// Largest synthesized audio body accepted
    pub(crate) max_audio_bytes: usize,
}

impl Default for PracticeApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: concat!("ieltspeak-api/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 2,
            retry_base_delay: Duration::from_millis(500),
            max_audio_bytes: 16 * 1024 * 1024,
        }
    }
}

impl PracticeApiConfig {
    /// Create a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration taken from application settings.
    #[must_use]
    pub fn from_settings(settings: &ieltspeak_core::Settings) -> Self {
        Self::new()
            .with_base_url(settings.effective_api_base_url())
            .with_timeout(settings.effective_timeout())
    }

    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout.
    ///
    /// Defaults to 30 seconds.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum number of retry attempts for transient errors.
    ///
    /// Defaults to 2 retries.
    #[must_use]
    pub const fn with_max_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries;
        self
    }

    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    /// Cap on the size of a synthesized audio response.
    #[must_use]
    pub const fn with_max_audio_bytes(mut self, limit: usize) -> Self {
        self.max_audio_bytes = limit;
        self
    }
}
