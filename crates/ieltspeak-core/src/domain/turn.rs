//! Conversation turn types.
//!
//! A turn is one exchange unit: either the AI asking a question or the user
//! answering it. Turns are immutable once appended to the log.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::audio::PlaybackHandle;

/// Identifier of a turn, unique within one conversation log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TurnId(pub u64);

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    Ai,
    User,
}

impl Sender {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ai => "ai",
            Self::User => "user",
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a turn carries. Exactly one of text or audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnPayload {
    Text(String),
    Audio(PlaybackHandle),
}

/// Data for appending a turn. The log assigns the id when none is given.
#[derive(Debug, Clone)]
pub struct NewTurn {
    pub id: Option<TurnId>,
    pub sender: Sender,
    pub payload: TurnPayload,
    /// Synthesized rendition of an AI question, kept for replay.
    pub replay: Option<PlaybackHandle>,
}

impl NewTurn {
    /// An AI question, optionally with the audio it was spoken with.
    #[must_use]
    pub fn ai(text: impl Into<String>, audio: Option<PlaybackHandle>) -> Self {
        Self {
            id: None,
            sender: Sender::Ai,
            payload: TurnPayload::Text(text.into()),
            replay: audio,
        }
    }

    /// A recorded user answer.
    #[must_use]
    pub const fn user(recording: PlaybackHandle) -> Self {
        Self {
            id: None,
            sender: Sender::User,
            payload: TurnPayload::Audio(recording),
            replay: None,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: TurnId) -> Self {
        self.id = Some(id);
        self
    }
}

/// A turn stored in the conversation log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    id: TurnId,
    sender: Sender,
    payload: TurnPayload,
    replay: Option<PlaybackHandle>,
    created_at: DateTime<Utc>,
}

impl Turn {
    pub(crate) fn from_new(id: TurnId, new: NewTurn) -> Self {
        Self {
            id,
            sender: new.sender,
            payload: new.payload,
            replay: new.replay,
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> TurnId {
        self.id
    }

    #[must_use]
    pub const fn sender(&self) -> Sender {
        self.sender
    }

    #[must_use]
    pub const fn payload(&self) -> &TurnPayload {
        &self.payload
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Text of the turn, for AI questions.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.payload {
            TurnPayload::Text(text) => Some(text),
            TurnPayload::Audio(_) => None,
        }
    }

    /// Audio that replaying this turn would play, if any exists yet.
    #[must_use]
    pub const fn playable(&self) -> Option<&PlaybackHandle> {
        match &self.payload {
            TurnPayload::Audio(handle) => Some(handle),
            TurnPayload::Text(_) => self.replay.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audio::AudioFormat;

    #[test]
    fn ai_turn_carries_text_and_optional_audio() {
        let audio = PlaybackHandle::new(AudioFormat::Mpeg, vec![1]);
        let turn = Turn::from_new(TurnId(1), NewTurn::ai("Hello?", Some(audio.clone())));
        assert_eq!(turn.sender(), Sender::Ai);
        assert_eq!(turn.text(), Some("Hello?"));
        assert_eq!(turn.playable(), Some(&audio));
    }

    #[test]
    fn text_only_ai_turn_has_nothing_to_play() {
        let turn = Turn::from_new(TurnId(1), NewTurn::ai("Hello?", None));
        assert!(turn.playable().is_none());
    }

    #[test]
    fn user_turn_carries_recording() {
        let recording = PlaybackHandle::new(AudioFormat::Wav, vec![1, 2]);
        let turn = Turn::from_new(TurnId(2), NewTurn::user(recording.clone()));
        assert_eq!(turn.sender(), Sender::User);
        assert!(turn.text().is_none());
        assert_eq!(turn.playable(), Some(&recording));
    }

    #[test]
    fn sender_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Sender::Ai).unwrap(), "\"ai\"");
        assert_eq!(Sender::User.to_string(), "user");
    }
}
