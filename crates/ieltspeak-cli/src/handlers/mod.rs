//! Command handlers.
//!
//! Handlers follow one pattern:
//! - Signature: `pub async fn execute(ctx: &CliContext, ...) -> Result<()>`
//! - Thin wrappers that parse CLI input, call the client or the session
//!   controller, and print through `presentation`

pub mod practice;
pub mod question;
pub mod questions;
pub mod tips;
pub mod topics;
