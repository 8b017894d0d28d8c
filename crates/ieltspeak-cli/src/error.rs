//! CLI-specific error types and their exit codes.

use ieltspeak_api::ApiError;
use ieltspeak_core::{FetchError, SettingsError};
use ieltspeak_voice::{SessionError, VoiceError};
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid settings or flags.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The practice service failed.
    #[error("Practice service error: {0}")]
    Service(String),

    /// The audio device could not be opened or used.
    #[error("Audio error: {0}")]
    Audio(String),

    /// Built without the `local-audio` feature.
    #[error(
        "audio support is not compiled in; rebuild with `--features local-audio` to practise"
    )]
    AudioUnavailable,

    /// Terminal I/O failed.
    #[error("IO error: {0}")]
    Io(String),
}

impl CliError {
    /// Map error to an exit code (sysexits.h where one fits).
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Service(_) => 69,                          // EX_UNAVAILABLE
            Self::Audio(_) | Self::AudioUnavailable => 72,   // EX_OSFILE
            Self::Io(_) => 74,                               // EX_IOERR
            Self::Config(_) => 78,                           // EX_CONFIG
        }
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::InvalidUrl(_) => Self::Config(err.to_string()),
            other => Self::Service(other.to_string()),
        }
    }
}

impl From<FetchError> for CliError {
    fn from(err: FetchError) -> Self {
        Self::Service(err.to_string())
    }
}

impl From<VoiceError> for CliError {
    fn from(err: VoiceError) -> Self {
        Self::Audio(err.to_string())
    }
}

impl From<SessionError> for CliError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Fetch(_) => Self::Service(err.to_string()),
            other => Self::Audio(other.to_string()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_sysexits() {
        assert_eq!(CliError::Config("bad".into()).exit_code(), 78);
        assert_eq!(CliError::Service("down".into()).exit_code(), 69);
        assert_eq!(CliError::AudioUnavailable.exit_code(), 72);
    }

    #[test]
    fn settings_errors_are_config_errors() {
        let err: CliError = SettingsError::InvalidTimeout(0).into();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn fetch_errors_are_service_errors() {
        let err: CliError = FetchError::Network("refused".into()).into();
        assert!(matches!(err, CliError::Service(_)));
        assert!(err.to_string().contains("refused"));
    }

    #[test]
    fn session_fetch_errors_are_service_errors() {
        let err: CliError = SessionError::Fetch(FetchError::NotFound("q1".into())).into();
        assert!(matches!(err, CliError::Service(_)));
        let err: CliError = SessionError::DeviceBusy.into();
        assert!(matches!(err, CliError::Audio(_)));
    }
}
