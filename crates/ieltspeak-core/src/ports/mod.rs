//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the session controller expects from
//! infrastructure. They contain no implementation details and use only
//! domain types.
//!
//! # Design Rules
//!
//! - No `reqwest` types in any signature
//! - Errors are `Clone` so they can be surfaced as session notices
//! - Traits are object-safe (`Arc<dyn QuestionSource>`)

pub mod question_source;
pub mod speech;

pub use question_source::{FetchError, QuestionSource, StaticQuestionSource};
pub use speech::{NoopSynthesizer, SpeechSynthesizer, SynthesisError};
