//! Core domain types.
//!
//! These types represent the pure domain model, independent of any
//! infrastructure concerns (HTTP, audio hardware, etc.).
//!
//! # Structure
//!
//! - `question` - Categories, questions and the cyclic question deck
//! - `turn` - Conversation turns (`Turn`, `NewTurn`)
//! - `audio` - Playback handles and their lifecycle states

pub mod audio;
pub mod question;
pub mod turn;

pub use audio::{AudioFormat, HandleId, PlaybackHandle, PlaybackState};
pub use question::{
    Category, EmptyDeck, ParseCategoryError, PracticeSelection, Question, QuestionDeck,
};
pub use turn::{NewTurn, Sender, Turn, TurnId, TurnPayload};
