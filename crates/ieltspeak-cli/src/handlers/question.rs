//! `ieltspeak question <id>`: show one question.

use anyhow::Result;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::format_question;

pub async fn execute(ctx: &CliContext, id: &str) -> Result<()> {
    let question = ctx
        .client()
        .fetch_question(id)
        .await
        .map_err(CliError::from)?;
    print!("{}", format_question(&question));
    Ok(())
}
