//! `AudioBackend`: the seam between [`AudioDevice`](crate::device::AudioDevice)
//! and the platform audio stack.
//!
//! | Implementor | Where used |
//! |---|---|
//! | `LocalAudioBackend` | CLI with the `local-audio` feature (cpal + rodio) |
//! | test fakes | integration tests, with a call journal |
//!
//! Backends are dumb: they do what they are told. Exclusivity, permission
//! caching and completion bookkeeping live in the device.

use async_trait::async_trait;
use ieltspeak_core::{AudioFormat, PlaybackHandle};

use crate::error::VoiceError;

/// Callback invoked when a clip plays to its natural end.
///
/// Must not fire when playback is stopped or the clip unloaded.
pub type PlaybackDoneCallback = Box<dyn FnOnce() + Send + 'static>;

/// Outcome of a microphone permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// Encoded result of a capture. Empty `data` means nothing was captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedAudio {
    pub data: Vec<u8>,
    pub format: AudioFormat,
}

/// Platform audio operations. Object-safe (`Arc<dyn AudioBackend>`).
#[async_trait]
pub trait AudioBackend: Send + Sync {
    /// Prompt for (or look up) microphone permission.
    async fn request_microphone_permission(&self) -> Result<PermissionStatus, VoiceError>;

    /// Open the microphone and start accumulating audio.
    async fn start_capture(&self) -> Result<(), VoiceError>;

    /// Close the microphone and return what was captured.
    async fn stop_capture(&self) -> Result<CapturedAudio, VoiceError>;

    /// Close the microphone and discard what was captured.
    async fn abort_capture(&self) -> Result<(), VoiceError>;

    /// Load a clip, ready to play. At most one clip is loaded at a time.
    async fn load(&self, handle: &PlaybackHandle) -> Result<(), VoiceError>;

    /// Start the loaded clip; `on_complete` fires on natural end only.
    async fn play(&self, on_complete: PlaybackDoneCallback) -> Result<(), VoiceError>;

    /// Stop the loaded clip without firing its completion callback.
    async fn stop_playback(&self) -> Result<(), VoiceError>;

    /// Release the loaded clip.
    async fn unload(&self) -> Result<(), VoiceError>;
}
