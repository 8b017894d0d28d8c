//! Session state machine states.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where the practice session is in its question/answer loop.
///
/// ```text
///   Idle → AskingQuestion → AwaitingAnswer → Recording → Advancing ─┐
///                ▲                                                 │
///                └─────────────────────────────────────────────────┘
///   any state → Idle (teardown)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    /// No session, or torn down.
    #[default]
    Idle,

    /// The current question is being fetched, synthesized or played.
    AskingQuestion,

    /// Waiting for the user to press record.
    AwaitingAnswer,

    /// The microphone is open.
    Recording,

    /// An answer was logged; the next question is due after a short delay.
    Advancing,
}

impl SessionState {
    /// Short indicator label for the presentation layer.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AskingQuestion => "asking",
            Self::AwaitingAnswer => "awaiting",
            Self::Recording => "recording",
            Self::Advancing => "advancing",
        }
    }

    /// Whether a session is running.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_idle_is_inactive() {
        assert!(!SessionState::Idle.is_active());
        assert!(SessionState::Recording.is_active());
        assert_eq!(SessionState::default(), SessionState::Idle);
    }

    #[test]
    fn display_uses_indicator_labels() {
        assert_eq!(SessionState::AwaitingAnswer.to_string(), "awaiting");
        assert_eq!(SessionState::AskingQuestion.to_string(), "asking");
    }
}
