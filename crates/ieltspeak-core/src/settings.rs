//! Settings domain types and validation.
//!
//! Settings are read from `IELTSPEAK_*` environment variables. Every field is
//! optional so that unset variables fall back to the `effective_*` defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default base URL of the practice service.
pub const DEFAULT_API_URL: &str = "http://localhost:4300/api/v1";

/// Default HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default pause between a recorded answer and the next question.
pub const DEFAULT_ADVANCE_DELAY_MS: u64 = 1_000;

pub const ENV_API_URL: &str = "IELTSPEAK_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "IELTSPEAK_TIMEOUT_SECS";
pub const ENV_ADVANCE_DELAY_MS: &str = "IELTSPEAK_ADVANCE_DELAY_MS";
pub const ENV_DUPLEX_AUDIO: &str = "IELTSPEAK_DUPLEX_AUDIO";

/// Application settings structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the practice-questions and audio service.
    pub api_base_url: Option<String>,

    /// HTTP request timeout in seconds.
    pub request_timeout_secs: Option<u64>,

    /// Delay before advancing to the next question, in milliseconds.
    pub advance_delay_ms: Option<u64>,

    /// Allow recording while audio is playing.
    pub duplex_audio: Option<bool>,
}

impl Settings {
    /// Create settings with sensible defaults.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            api_base_url: Some(DEFAULT_API_URL.to_string()),
            request_timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
            advance_delay_ms: Some(DEFAULT_ADVANCE_DELAY_MS),
            duplex_audio: Some(false),
        }
    }

    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_vars(std::env::vars())
    }

    /// Read settings from `(name, value)` pairs. Unknown names are ignored.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, SettingsError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut settings = Self::default();
        for (name, value) in vars {
            let value = value.as_ref().trim();
            match name.as_ref() {
                ENV_API_URL => settings.api_base_url = Some(value.to_string()),
                ENV_TIMEOUT_SECS => {
                    settings.request_timeout_secs = Some(parse_number(ENV_TIMEOUT_SECS, value)?);
                }
                ENV_ADVANCE_DELAY_MS => {
                    settings.advance_delay_ms = Some(parse_number(ENV_ADVANCE_DELAY_MS, value)?);
                }
                ENV_DUPLEX_AUDIO => settings.duplex_audio = Some(parse_flag(value)?),
                _ => {}
            }
        }

        validate_settings(&settings)?;
        tracing::debug!(?settings, "Settings loaded from environment");
        Ok(settings)
    }

    #[must_use]
    pub fn effective_api_base_url(&self) -> &str {
        self.api_base_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    #[must_use]
    pub fn effective_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    #[must_use]
    pub fn effective_advance_delay(&self) -> Duration {
        Duration::from_millis(self.advance_delay_ms.unwrap_or(DEFAULT_ADVANCE_DELAY_MS))
    }

    #[must_use]
    pub fn effective_duplex_audio(&self) -> bool {
        self.duplex_audio.unwrap_or(false)
    }
}

/// Settings validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("{name} must be a non-negative integer, got '{value}'")]
    NotANumber { name: &'static str, value: String },

    #[error("{ENV_DUPLEX_AUDIO} must be true/false/1/0, got '{0}'")]
    NotAFlag(String),

    #[error("API URL must start with http:// or https://, got '{0}'")]
    InvalidApiUrl(String),

    #[error("Request timeout must be between 1 and 600 seconds, got {0}")]
    InvalidTimeout(u64),

    #[error("Advance delay must be at most 60000 ms, got {0}")]
    InvalidAdvanceDelay(u64),
}

/// Validate settings values.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    if let Some(ref url) = settings.api_base_url {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(SettingsError::InvalidApiUrl(url.clone()));
        }
    }

    if let Some(secs) = settings.request_timeout_secs {
        if !(1..=600).contains(&secs) {
            return Err(SettingsError::InvalidTimeout(secs));
        }
    }

    if let Some(ms) = settings.advance_delay_ms {
        if ms > 60_000 {
            return Err(SettingsError::InvalidAdvanceDelay(ms));
        }
    }

    Ok(())
}

fn parse_number(name: &'static str, value: &str) -> Result<u64, SettingsError> {
    value.parse().map_err(|_| SettingsError::NotANumber {
        name,
        value: value.to_string(),
    })
}

fn parse_flag(value: &str) -> Result<bool, SettingsError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(SettingsError::NotAFlag(value.to_string())),
    }
}
