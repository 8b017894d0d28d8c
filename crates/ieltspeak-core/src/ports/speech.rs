//! Speech synthesis port.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::PlaybackHandle;

/// Failure to obtain synthesized speech.
///
/// Non-fatal for a session: the question is still shown as text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthesisError {
    #[error("nothing to synthesize")]
    EmptyText,

    #[error("speech service unreachable: {0}")]
    Network(String),

    #[error("speech service timed out")]
    Timeout,

    #[error("speech service returned status {0}")]
    Status(u16),

    #[error("speech stream failed: {0}")]
    Stream(String),

    #[error("speech synthesis is not available")]
    Unavailable,
}

/// Port for turning text into a playable audio handle.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text`; resolves once the audio is ready to play.
    async fn synthesize(&self, text: &str) -> Result<PlaybackHandle, SynthesisError>;
}

/// Synthesizer for text-only sessions. Always reports [`SynthesisError::Unavailable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSynthesizer;

#[async_trait]
impl SpeechSynthesizer for NoopSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<PlaybackHandle, SynthesisError> {
        if text.trim().is_empty() {
            return Err(SynthesisError::EmptyText);
        }
        Err(SynthesisError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_synthesizer_is_unavailable() {
        let err = NoopSynthesizer.synthesize("Hello").await.unwrap_err();
        assert_eq!(err, SynthesisError::Unavailable);
        assert_eq!(
            NoopSynthesizer.synthesize("  ").await.unwrap_err(),
            SynthesisError::EmptyText
        );
    }
}
