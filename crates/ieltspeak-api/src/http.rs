//! HTTP backend abstraction for the practice API.
//!
//! The production implementation uses reqwest with automatic retry for
//! transient errors. Tests use the fake backend in [`testing`].

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{ApiError, ApiResult};
use crate::models::ApiConfig;

// ============================================================================
// HTTP Backend Trait
// ============================================================================

/// Raw response body plus its declared content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryBody {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Trait for HTTP backends used by the practice client.
///
/// This is an implementation detail; external code goes through the core ports.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    /// Fetch JSON from a URL and deserialize it.
    async fn get_json<T: DeserializeOwned + Send>(&self, url: &Url) -> ApiResult<T>;

    /// Fetch a binary body, reading at most `limit` bytes.
    async fn get_bytes(&self, url: &Url, limit: usize) -> ApiResult<BinaryBody>;
}

// ============================================================================
// Reqwest Backend
// ============================================================================

/// Production HTTP backend using reqwest with retry logic.
///
/// Retries server errors (5xx) and network errors with exponential backoff.
pub struct ReqwestBackend {
    client: reqwest::Client,
    max_retries: u8,
    retry_base_delay_ms: u64,
}

impl ReqwestBackend {
    pub fn new(config: &ApiConfig) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            max_retries: config.max_retries,
            retry_base_delay_ms: config.retry_base_delay_ms,
        })
    }

    /// Fetch a URL with automatic retry for transient errors.
    async fn fetch_with_retry(&self, url: &Url) -> ApiResult<reqwest::Response> {
        let mut last_error: Option<ApiError> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = retry_delay(self.retry_base_delay_ms, attempt);
                tracing::debug!(%url, attempt, ?delay, "Retrying practice API request");
                tokio::time::sleep(delay).await;
            }

            match self.client.get(url.as_str()).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }

                    // 5xx errors are retryable (server-side issues)
                    if status.is_server_error() && attempt < self.max_retries {
                        last_error = Some(ApiError::ApiRequestFailed {
                            status: status.as_u16(),
                            url: url.to_string(),
                        });
                        continue;
                    }

                    if status.as_u16() == 404 {
                        if let Some(id) = extract_question_id_from_path(url.path()) {
                            return Err(ApiError::NotFound(id));
                        }
                    }

                    return Err(ApiError::ApiRequestFailed {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                }
                Err(e) => {
                    // Network errors are retryable, timeouts included
                    if attempt < self.max_retries {
                        tracing::warn!(%url, error = %e, "Practice API request failed");
                        last_error = Some(e.into());
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ApiError::InvalidResponse {
            message: "Unknown error during fetch".to_string(),
        }))
    }
}

/// Backoff before retry `attempt` (1-based): `base * 2^(attempt - 1)`,
/// saturating instead of overflowing for large retry counts.
fn retry_delay(base_ms: u64, attempt: u8) -> Duration {
    let factor = 2u64
        .checked_pow(u32::from(attempt.saturating_sub(1)))
        .unwrap_or(u64::MAX);
    Duration::from_millis(base_ms.saturating_mul(factor))
}

/// Extract the question id from a `.../question/{id}` path.
fn extract_question_id_from_path(path: &str) -> Option<String> {
    let (_, rest) = path.rsplit_once("/question/")?;
    let id = rest.trim_end_matches('/');
    if id.is_empty() || id.contains('/') {
        return None;
    }
    Some(urlencoding::decode(id).map_or_else(|_| id.to_string(), |s| s.into_owned()))
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn get_json<T: DeserializeOwned + Send>(&self, url: &Url) -> ApiResult<T> {
        let response = self.fetch_with_retry(url).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn get_bytes(&self, url: &Url, limit: usize) -> ApiResult<BinaryBody> {
        let response = self.fetch_with_retry(url).await?;

        if let Some(len) = response.content_length() {
            if !usize::try_from(len).is_ok_and(|len| len <= limit) {
                return Err(ApiError::PayloadTooLarge { limit });
            }
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string);

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if bytes.len() + chunk.len() > limit {
                return Err(ApiError::PayloadTooLarge { limit });
            }
            bytes.extend_from_slice(&chunk);
        }

        tracing::debug!(%url, bytes = bytes.len(), ?content_type, "Binary body received");
        Ok(BinaryBody {
            bytes,
            content_type,
        })
    }
}

// ============================================================================
// Fake Backend for Testing
// ============================================================================

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Canned response for the fake backend.
    #[derive(Clone)]
    pub enum CannedResponse {
        Json(serde_json::Value),
        Bytes(BinaryBody),
        Status(u16),
    }

    /// A fake HTTP backend that returns canned responses and records requests.
    #[derive(Default)]
    pub struct FakeBackend {
        responses: Arc<Mutex<HashMap<String, CannedResponse>>>,
        requests: Arc<Mutex<Vec<String>>>,
    }

    impl FakeBackend {
        pub fn new() -> Self {
            Self::default()
        }

        /// Add a canned response for URLs containing `url_contains`.
        pub fn with_response(self, url_contains: &str, response: CannedResponse) -> Self {
            self.responses
                .lock()
                .unwrap()
                .insert(url_contains.to_string(), response);
            self
        }

        /// URLs requested so far, in order.
        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }

        fn find_response(&self, url: &Url) -> ApiResult<CannedResponse> {
            self.requests.lock().unwrap().push(url.to_string());
            let responses = self.responses.lock().unwrap();
            let response = responses
                .iter()
                .find(|(pattern, _)| url.as_str().contains(pattern.as_str()))
                .map(|(_, response)| response.clone());

            match response {
                Some(CannedResponse::Status(status)) => Err(ApiError::ApiRequestFailed {
                    status,
                    url: url.to_string(),
                }),
                None => Err(ApiError::ApiRequestFailed {
                    status: 404,
                    url: url.to_string(),
                }),
                Some(response) => Ok(response),
            }
        }
    }

    #[async_trait]
    impl HttpBackend for FakeBackend {
        async fn get_json<T: DeserializeOwned + Send>(&self, url: &Url) -> ApiResult<T> {
            match self.find_response(url)? {
                CannedResponse::Json(json) => serde_json::from_value(json).map_err(Into::into),
                _ => Err(ApiError::InvalidResponse {
                    message: "expected JSON".to_string(),
                }),
            }
        }

        async fn get_bytes(&self, url: &Url, limit: usize) -> ApiResult<BinaryBody> {
            match self.find_response(url)? {
                CannedResponse::Bytes(body) if body.bytes.len() > limit => {
                    Err(ApiError::PayloadTooLarge { limit })
                }
                CannedResponse::Bytes(body) => Ok(body),
                _ => Err(ApiError::InvalidResponse {
                    message: "expected binary body".to_string(),
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_delay_doubles_and_saturates() {
        assert_eq!(retry_delay(500, 1), Duration::from_millis(500));
        assert_eq!(retry_delay(500, 3), Duration::from_millis(2000));
        assert_eq!(retry_delay(500, 65), Duration::from_millis(u64::MAX));
        assert_eq!(retry_delay(500, u8::MAX), Duration::from_millis(u64::MAX));
    }

    #[test]
    fn test_extract_question_id_from_path() {
        assert_eq!(
            extract_question_id_from_path("/api/v1/question/abc123"),
            Some("abc123".to_string())
        );
        assert_eq!(
            extract_question_id_from_path("/api/v1/question/with%20space/"),
            Some("with space".to_string())
        );
        assert_eq!(extract_question_id_from_path("/api/v1/questions"), None);
        assert_eq!(extract_question_id_from_path("/api/v1/question/"), None);
    }

    #[test]
    fn test_reqwest_backend_creation() {
        let config = ApiConfig::default();
        let backend = ReqwestBackend::new(&config).unwrap();
        assert_eq!(backend.max_retries, 2);
        assert_eq!(backend.retry_base_delay_ms, 500);
    }

    mod fake_backend_tests {
        use super::super::testing::*;
        use super::*;
        use serde_json::json;

        #[tokio::test]
        async fn test_fake_backend_returns_canned_json() {
            let backend = FakeBackend::new()
                .with_response("questions", CannedResponse::Json(json!([{"content": "Hi"}])));

            let url = Url::parse("http://localhost/questions?category=PART1").unwrap();
            let result: serde_json::Value = backend.get_json(&url).await.unwrap();

            assert_eq!(result[0]["content"], "Hi");
            assert_eq!(backend.requests().len(), 1);
        }

        #[tokio::test]
        async fn test_fake_backend_returns_404_for_unknown_url() {
            let backend = FakeBackend::new();
            let url = Url::parse("http://localhost/unknown").unwrap();

            let result: ApiResult<serde_json::Value> = backend.get_json(&url).await;
            assert!(matches!(
                result,
                Err(ApiError::ApiRequestFailed { status: 404, .. })
            ));
        }

        #[tokio::test]
        async fn test_fake_backend_enforces_byte_limit() {
            let backend = FakeBackend::new().with_response(
                "audio",
                CannedResponse::Bytes(BinaryBody {
                    bytes: vec![0; 32],
                    content_type: None,
                }),
            );
            let url = Url::parse("http://localhost/audio/stream").unwrap();

            assert!(matches!(
                backend.get_bytes(&url, 16).await,
                Err(ApiError::PayloadTooLarge { limit: 16 })
            ));
            assert_eq!(backend.get_bytes(&url, 64).await.unwrap().bytes.len(), 32);
        }
    }
}
