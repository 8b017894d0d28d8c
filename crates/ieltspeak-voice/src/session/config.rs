//! Session configuration.

use std::time::Duration;

use ieltspeak_core::{Category, PracticeSelection, Settings};

/// Configuration for one practice session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Test part (or full test) to practise.
    pub selection: PracticeSelection,

    /// Pause between a logged answer and the next question.
    pub advance_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            selection: PracticeSelection::Part(Category::Part1),
            advance_delay: Duration::from_secs(1),
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn new(selection: impl Into<PracticeSelection>) -> Self {
        Self {
            selection: selection.into(),
            ..Self::default()
        }
    }

    /// Session config for `selection` with the delay from `settings`.
    #[must_use]
    pub fn from_settings(selection: impl Into<PracticeSelection>, settings: &Settings) -> Self {
        Self {
            selection: selection.into(),
            advance_delay: settings.effective_advance_delay(),
        }
    }

    #[must_use]
    pub const fn with_advance_delay(mut self, delay: Duration) -> Self {
        self.advance_delay = delay;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_part1_with_one_second_delay() {
        let config = SessionConfig::default();
        assert_eq!(config.selection, PracticeSelection::Part(Category::Part1));
        assert_eq!(config.advance_delay, Duration::from_secs(1));
    }

    #[test]
    fn delay_comes_from_settings() {
        let settings = Settings {
            advance_delay_ms: Some(250),
            ..Settings::default()
        };
        let config = SessionConfig::from_settings(PracticeSelection::FullTest, &settings);
        assert_eq!(config.selection, PracticeSelection::FullTest);
        assert_eq!(config.advance_delay, Duration::from_millis(250));
    }
}
