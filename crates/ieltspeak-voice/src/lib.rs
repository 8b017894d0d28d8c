#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

pub mod audio_io;
pub mod device;
pub mod error;
pub mod gate;
pub mod session;

#[cfg(feature = "local-audio")]
pub mod local;

// Re-export key types for convenience
pub use audio_io::{AudioBackend, CapturedAudio, PermissionStatus, PlaybackDoneCallback};
pub use device::{
    AudioDevice, AudioDeviceConfig, PlaybackCompletion, PlaybackEnd, RecordingSession,
    ToggleOutcome,
};
pub use error::{SessionError, VoiceError};
pub use gate::SpeakerGate;
pub use session::{
    NO_QUESTION_TEXT, NoticeKind, ReplayOutcome, SessionConfig, SessionController, SessionEvent,
    SessionHandle, SessionNotice, SessionSnapshot, SessionState,
};

#[cfg(feature = "local-audio")]
pub use local::LocalAudioBackend;

// Silence unused dev-dependency warnings
#[cfg(test)]
use mockall as _;
#[cfg(test)]
use tokio_test as _;
