#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

pub mod conversation;
pub mod domain;
pub mod ports;
pub mod settings;
pub mod tips;

// Re-export commonly used types for convenience
pub use conversation::ConversationLog;
pub use domain::{
    AudioFormat, Category, EmptyDeck, HandleId, NewTurn, ParseCategoryError, PlaybackHandle,
    PlaybackState, PracticeSelection, Question, QuestionDeck, Sender, Turn, TurnId, TurnPayload,
};
pub use ports::{
    FetchError, NoopSynthesizer, QuestionSource, SpeechSynthesizer, StaticQuestionSource,
    SynthesisError,
};
pub use settings::{Settings, SettingsError, validate_settings};
