//! Practice service client.
//!
//! `PracticeClient` is generic over the HTTP backend so it can be tested with
//! canned responses. Production code uses [`DefaultPracticeClient`].

mod questions;
mod speech;

use crate::config::PracticeApiConfig;
use crate::error::ApiResult;
use crate::http::{HttpBackend, ReqwestBackend};
use crate::models::ApiConfig;

// ============================================================================
// Type Aliases
// ============================================================================

/// Practice client using the reqwest HTTP backend.
pub type DefaultPracticeClient = PracticeClient<ReqwestBackend>;

// ============================================================================
// Client
// ============================================================================

/// Client for the practice-questions and speech endpoints.
pub struct PracticeClient<B: HttpBackend> {
    pub(crate) backend: B,
    pub(crate) config: ApiConfig,
}

impl DefaultPracticeClient {
    /// Create a new client with the given configuration.
    ///
    /// Fails when the base URL does not parse or the HTTP client cannot be built.
    pub fn new(config: &PracticeApiConfig) -> ApiResult<Self> {
        let config = ApiConfig::from_public(config)?;
        let backend = ReqwestBackend::new(&config)?;
        tracing::debug!(base_url = %config.base_url, "Practice client created");
        Ok(Self { backend, config })
    }
}

impl<B: HttpBackend> PracticeClient<B> {
    /// Create a new client with a custom backend.
    #[cfg(test)]
    pub(crate) const fn with_backend(config: ApiConfig, backend: B) -> Self {
        Self { backend, config }
    }

    /// Base URL requests are resolved against.
    pub fn base_url(&self) -> &str {
        self.config.base_url.as_str()
    }
}
