//! Append-only conversation log.
//!
//! Insertion order is chronological order is display order. The log never
//! reorders or removes turns while a session is active; [`ConversationLog::clear`]
//! exists only for session teardown.

use std::collections::HashSet;

use crate::domain::{NewTurn, Turn, TurnId};

/// Ordered sequence of conversation turns with unique ids.
#[derive(Debug, Clone, Default)]
pub struct ConversationLog {
    turns: Vec<Turn>,
    ids: HashSet<TurnId>,
    next_id: u64,
}

impl ConversationLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn, assigning the next monotonic id when none is supplied.
    ///
    /// # Panics
    ///
    /// Panics if the supplied id is already present. Duplicate ids are a
    /// programming error on the caller's side.
    pub fn append(&mut self, turn: NewTurn) -> &Turn {
        let id = turn.id.unwrap_or(TurnId(self.next_id));
        assert!(
            self.ids.insert(id),
            "turn id {id} appended twice to the conversation log"
        );
        self.next_id = self.next_id.max(id.0 + 1);

        self.turns.push(Turn::from_new(id, turn));
        let appended = &self.turns[self.turns.len() - 1];
        tracing::debug!(turn = %appended.id(), sender = %appended.sender(), "Turn appended");
        appended
    }

    /// All turns in chronological order.
    #[must_use]
    pub fn all(&self) -> &[Turn] {
        &self.turns
    }

    #[must_use]
    pub fn get(&self, id: TurnId) -> Option<&Turn> {
        if !self.ids.contains(&id) {
            return None;
        }
        self.turns.iter().find(|turn| turn.id() == id)
    }

    #[must_use]
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Drop every turn. Called when the session is torn down.
    pub fn clear(&mut self) {
        self.turns.clear();
        self.ids.clear();
        self.next_id = 0;
    }
}
