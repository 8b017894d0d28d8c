//! `ieltspeak topics`: list the topics of one part.

use anyhow::Result;
use ieltspeak_core::Category;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::format_topics;

pub async fn execute(ctx: &CliContext, category: Category) -> Result<()> {
    let topics = ctx
        .client()
        .fetch_topics(category)
        .await
        .map_err(CliError::from)?;
    print!("{}", format_topics(category, &topics));
    Ok(())
}
