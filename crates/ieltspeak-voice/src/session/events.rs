//! Events and snapshots published by the session controller.

use ieltspeak_core::{HandleId, Turn, TurnId};

use crate::device::PlaybackEnd;
use crate::error::SessionError;

use super::state::SessionState;

/// Category of a user-visible notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Fetch,
    Synthesis,
    Permission,
    DeviceBusy,
    NoAudio,
    Device,
    NotReady,
    TurnNotFound,
}

impl NoticeKind {
    /// Notice category for an error; `None` for errors that are never shown.
    #[must_use]
    pub const fn for_error(err: &SessionError) -> Option<Self> {
        Some(match err {
            SessionError::Fetch(_) => Self::Fetch,
            SessionError::Synthesis(_) => Self::Synthesis,
            SessionError::Permission => Self::Permission,
            SessionError::DeviceBusy => Self::DeviceBusy,
            SessionError::NoAudio => Self::NoAudio,
            SessionError::Device(_) => Self::Device,
            SessionError::NotReady { .. } | SessionError::AlreadyActive => Self::NotReady,
            SessionError::TurnNotFound(_) => Self::TurnNotFound,
            SessionError::Cancelled | SessionError::Closed => return None,
        })
    }
}

/// A discrete, dismissable notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionNotice {
    pub kind: NoticeKind,
    pub message: String,
}

/// Events emitted to the presentation layer, in the order they happened.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    StateChanged(SessionState),

    /// A turn was appended to the conversation log.
    TurnAppended(Turn),

    /// A clip started playing. `turn` is the turn it belongs to.
    PlaybackStarted {
        handle: HandleId,
        turn: Option<TurnId>,
    },

    PlaybackFinished {
        handle: HandleId,
        end: PlaybackEnd,
    },

    Notice(SessionNotice),
}

/// Point-in-time view of the session, published through a `watch` channel.
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub cursor: usize,
    /// Number of fetched questions; zero before the first fetch.
    pub deck_len: usize,
    /// Conversation log in display order.
    pub turns: Vec<Turn>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ieltspeak_core::{FetchError, SynthesisError};

    #[test]
    fn user_facing_errors_become_notices() {
        let cases = [
            (
                SessionError::Fetch(FetchError::Network("down".into())),
                NoticeKind::Fetch,
            ),
            (
                SessionError::Synthesis(SynthesisError::Timeout),
                NoticeKind::Synthesis,
            ),
            (SessionError::Permission, NoticeKind::Permission),
            (SessionError::NoAudio, NoticeKind::NoAudio),
            (SessionError::AlreadyActive, NoticeKind::NotReady),
            (SessionError::TurnNotFound(TurnId(4)), NoticeKind::TurnNotFound),
        ];
        for (err, kind) in cases {
            assert_eq!(NoticeKind::for_error(&err), Some(kind), "{err}");
        }
    }

    #[test]
    fn shutdown_errors_are_silent() {
        assert_eq!(NoticeKind::for_error(&SessionError::Cancelled), None);
        assert_eq!(NoticeKind::for_error(&SessionError::Closed), None);
    }

    #[test]
    fn default_snapshot_is_idle_and_empty() {
        let snapshot = SessionSnapshot::default();
        assert_eq!(snapshot.state, SessionState::Idle);
        assert_eq!(snapshot.deck_len, 0);
        assert!(snapshot.turns.is_empty());
    }
}
