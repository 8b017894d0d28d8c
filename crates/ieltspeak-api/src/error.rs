//! Internal error types for practice API operations.
//!
//! These errors are mapped to the core port errors (`FetchError`,
//! `SynthesisError`) at the boundary.

use ieltspeak_core::{FetchError, SynthesisError};
use thiserror::Error;

/// Result type alias for practice API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors related to practice API operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// API request failed with an HTTP error status.
    #[error("practice API request failed with status {status}: {url}")]
    ApiRequestFailed {
        /// HTTP status code
        status: u16,
        /// The URL that was requested
        url: String,
    },

    /// API returned an invalid or unexpected response.
    #[error("Invalid response from practice API: {message}")]
    InvalidResponse {
        /// Description of what was invalid
        message: String,
    },

    /// The requested resource does not exist.
    #[error("'{0}' not found")]
    NotFound(String),

    /// The audio body exceeded the configured limit.
    #[error("response body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    /// Network or HTTP client error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON parsing error.
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl From<ApiError> for FetchError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::ApiRequestFailed { status, url } => Self::Status { status, url },
            ApiError::NotFound(what) => Self::NotFound(what),
            ApiError::Network(e) if e.is_decode() => Self::Malformed(e.to_string()),
            ApiError::Network(e) => Self::Network(e.to_string()),
            ApiError::InvalidUrl(e) => Self::Network(e.to_string()),
            ApiError::JsonParse(e) => Self::Malformed(e.to_string()),
            err @ (ApiError::InvalidResponse { .. } | ApiError::PayloadTooLarge { .. }) => {
                Self::Malformed(err.to_string())
            }
        }
    }
}

impl From<ApiError> for SynthesisError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::ApiRequestFailed { status, .. } => Self::Status(status),
            ApiError::NotFound(_) => Self::Status(404),
            ApiError::Network(e) if e.is_timeout() => Self::Timeout,
            ApiError::Network(e) if e.is_body() || e.is_decode() => Self::Stream(e.to_string()),
            ApiError::Network(e) => Self::Network(e.to_string()),
            ApiError::InvalidUrl(e) => Self::Network(e.to_string()),
            err @ (ApiError::InvalidResponse { .. }
            | ApiError::PayloadTooLarge { .. }
            | ApiError::JsonParse(_)) => Self::Stream(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_request_failed_error_message() {
        let error = ApiError::ApiRequestFailed {
            status: 503,
            url: "http://localhost:4300/api/v1/questions".to_string(),
        };
        let msg = error.to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains("/questions"));
    }

    #[test]
    fn test_status_maps_to_fetch_status() {
        let error = ApiError::ApiRequestFailed {
            status: 500,
            url: "http://x/questions".to_string(),
        };
        assert_eq!(
            FetchError::from(error),
            FetchError::Status {
                status: 500,
                url: "http://x/questions".to_string()
            }
        );
    }

    #[test]
    fn test_bad_json_maps_to_malformed() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(
            FetchError::from(ApiError::from(json_err)),
            FetchError::Malformed(_)
        ));
    }

    #[test]
    fn test_synthesis_mapping() {
        let error = ApiError::ApiRequestFailed {
            status: 502,
            url: "http://x/audio/stream".to_string(),
        };
        assert_eq!(SynthesisError::from(error), SynthesisError::Status(502));

        let error = ApiError::PayloadTooLarge { limit: 10 };
        assert!(matches!(
            SynthesisError::from(error),
            SynthesisError::Stream(_)
        ));
    }
}
