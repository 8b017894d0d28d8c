//! Audio device and session error types.

use ieltspeak_core::{FetchError, SynthesisError, TurnId};

use crate::session::SessionState;

/// Errors raised by the audio device and its backends.
#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    /// No audio input device found.
    #[error("No audio input device found")]
    NoInputDevice,

    /// Failed to open audio input stream.
    #[error("Failed to open audio input stream: {0}")]
    InputStreamError(String),

    /// Failed to open audio output stream.
    #[error("Failed to open audio output stream: {0}")]
    OutputStreamError(String),

    /// Microphone permission denied or revoked.
    #[error("Microphone permission denied")]
    MicrophonePermissionDenied,

    /// The device is already recording, or is playing while a recording is requested.
    #[error("Audio device is busy")]
    DeviceBusy,

    /// A recording was stopped before any audio was captured.
    #[error("No audio was captured")]
    NoAudio,

    /// The recording session passed in is not the open one.
    #[error("No matching recording is open")]
    NoActiveRecording,

    /// A clip could not be decoded for playback.
    #[error("Failed to decode audio: {0}")]
    Decode(String),

    /// Audio resampling error.
    #[error("Audio resampling failed: {0}")]
    ResampleError(String),

    /// The dedicated audio thread is gone.
    #[error("Audio thread is no longer running")]
    AudioThreadDied,

    /// IO error while encoding a recording.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors returned by session actions. Each one is also published as a notice.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("no questions available: {0}")]
    Fetch(#[from] FetchError),

    #[error("question audio unavailable: {0}")]
    Synthesis(#[from] SynthesisError),

    #[error("microphone permission denied")]
    Permission,

    #[error("audio device is busy")]
    DeviceBusy,

    #[error("no audio was captured")]
    NoAudio,

    #[error("audio device error: {0}")]
    Device(String),

    #[error("not possible while the session is {state}")]
    NotReady { state: SessionState },

    #[error("a practice session is already running")]
    AlreadyActive,

    #[error("turn {0} does not exist")]
    TurnNotFound(TurnId),

    #[error("cancelled by teardown")]
    Cancelled,

    #[error("session has shut down")]
    Closed,
}

impl From<VoiceError> for SessionError {
    fn from(err: VoiceError) -> Self {
        match err {
            VoiceError::MicrophonePermissionDenied => Self::Permission,
            VoiceError::DeviceBusy => Self::DeviceBusy,
            VoiceError::NoAudio => Self::NoAudio,
            other => Self::Device(other.to_string()),
        }
    }
}
