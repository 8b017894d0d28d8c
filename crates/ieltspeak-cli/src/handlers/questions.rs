//! `ieltspeak questions`: list the questions of one part.

use anyhow::Result;
use ieltspeak_core::{Category, QuestionSource};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::format_question_list;

pub async fn execute(ctx: &CliContext, category: Category) -> Result<()> {
    let deck = ctx.client().fetch(category).await.map_err(CliError::from)?;
    tracing::debug!(%category, questions = deck.len(), "Questions fetched");

    println!("{} questions ({}):", category.label(), category.description());
    print!("{}", format_question_list(&deck));
    Ok(())
}
