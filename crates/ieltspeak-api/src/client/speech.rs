//! Streamed speech synthesis.

use async_trait::async_trait;
use ieltspeak_core::{AudioFormat, PlaybackHandle, SpeechSynthesizer, SynthesisError};

use crate::http::HttpBackend;
use crate::url::build_audio_stream_url;

use super::PracticeClient;

#[async_trait]
impl<B: HttpBackend> SpeechSynthesizer for PracticeClient<B> {
    async fn synthesize(&self, text: &str) -> Result<PlaybackHandle, SynthesisError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SynthesisError::EmptyText);
        }

        let url = build_audio_stream_url(&self.config, text).map_err(SynthesisError::from)?;
        let body = self
            .backend
            .get_bytes(&url, self.config.max_audio_bytes)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Speech synthesis request failed");
                SynthesisError::from(e)
            })?;

        if body.bytes.is_empty() {
            return Err(SynthesisError::Stream("empty audio stream".to_string()));
        }

        // The endpoint streams MP3 unless it says otherwise
        let format = body
            .content_type
            .as_deref()
            .map_or(AudioFormat::Mpeg, AudioFormat::from_mime);

        let handle = PlaybackHandle::new(format, body.bytes);
        tracing::debug!(handle = %handle.id(), bytes = handle.len(), "Speech synthesized");
        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::BinaryBody;
    use crate::http::testing::{CannedResponse, FakeBackend};
    use crate::models::ApiConfig;

    fn audio(bytes: Vec<u8>, content_type: Option<&str>) -> CannedResponse {
        CannedResponse::Bytes(BinaryBody {
            bytes,
            content_type: content_type.map(str::to_string),
        })
    }

    #[tokio::test]
    async fn test_synthesize_wraps_audio_in_handle() {
        let backend =
            FakeBackend::new().with_response("audio/stream", audio(vec![1, 2, 3], Some("audio/wav")));
        let client = PracticeClient::with_backend(ApiConfig::default(), backend);

        let handle = client.synthesize("Hello there").await.unwrap();

        assert_eq!(handle.format(), AudioFormat::Wav);
        assert_eq!(handle.bytes(), &[1, 2, 3]);
        assert!(client.backend.requests()[0].ends_with("text=Hello%20there"));
    }

    #[tokio::test]
    async fn test_missing_content_type_defaults_to_mpeg() {
        let backend = FakeBackend::new().with_response("audio/stream", audio(vec![7; 8], None));
        let client = PracticeClient::with_backend(ApiConfig::default(), backend);
        assert_eq!(
            client.synthesize("Hi").await.unwrap().format(),
            AudioFormat::Mpeg
        );
    }

    #[tokio::test]
    async fn test_blank_text_is_not_sent() {
        let client = PracticeClient::with_backend(ApiConfig::default(), FakeBackend::new());
        assert_eq!(
            client.synthesize("   ").await.unwrap_err(),
            SynthesisError::EmptyText
        );
        assert!(client.backend.requests().is_empty());
    }

    #[tokio::test]
    async fn test_server_error_maps_to_status() {
        let backend = FakeBackend::new().with_response("audio/stream", CannedResponse::Status(503));
        let client = PracticeClient::with_backend(ApiConfig::default(), backend);
        assert_eq!(
            client.synthesize("Hi").await.unwrap_err(),
            SynthesisError::Status(503)
        );
    }

    #[tokio::test]
    async fn test_oversized_audio_is_rejected() {
        let config = ApiConfig {
            max_audio_bytes: 4,
            ..ApiConfig::default()
        };
        let backend = FakeBackend::new().with_response("audio/stream", audio(vec![0; 10], None));
        let client = PracticeClient::with_backend(config, backend);
        assert!(matches!(
            client.synthesize("Hi").await.unwrap_err(),
            SynthesisError::Stream(_)
        ));
    }

    #[tokio::test]
    async fn test_empty_audio_is_an_error() {
        let backend = FakeBackend::new().with_response("audio/stream", audio(Vec::new(), None));
        let client = PracticeClient::with_backend(ApiConfig::default(), backend);
        assert!(matches!(
            client.synthesize("Hi").await.unwrap_err(),
            SynthesisError::Stream(_)
        ));
    }
}
