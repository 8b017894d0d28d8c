//! Question source port.
//!
//! The session controller pulls its ordered question list through this trait.
//! The HTTP adapter lives in `ieltspeak-api`; [`StaticQuestionSource`] serves
//! the built-in sample questions for offline practice and tests.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Category, PracticeSelection, Question, QuestionDeck};

/// Failure to obtain questions from the question bank.
///
/// Recoverable: the user may trigger a re-fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The service could not be reached.
    #[error("question service unreachable: {0}")]
    Network(String),

    /// The service answered with a non-success status.
    #[error("question service returned status {status} for {url}")]
    Status { status: u16, url: String },

    /// The response body could not be understood.
    #[error("malformed question list: {0}")]
    Malformed(String),

    /// The requested question does not exist.
    #[error("question '{0}' not found")]
    NotFound(String),
}

/// Port for fetching practice questions.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Fetch the ordered questions of one category.
    async fn fetch(&self, category: Category) -> Result<QuestionDeck, FetchError>;

    /// Fetch every category of a selection, concatenated in test order.
    ///
    /// The first failing category aborts the whole fetch.
    async fn fetch_selection(
        &self,
        selection: PracticeSelection,
    ) -> Result<QuestionDeck, FetchError> {
        let mut deck = QuestionDeck::default();
        for category in selection.categories() {
            deck.extend(self.fetch(category).await?);
        }
        Ok(deck)
    }
}

/// In-memory question source.
#[derive(Debug, Clone)]
pub struct StaticQuestionSource {
    questions: Vec<Question>,
}

impl StaticQuestionSource {
    /// Serve an explicit list; `fetch` filters it by category.
    #[must_use]
    pub const fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    /// One built-in sample question per category.
    #[must_use]
    pub fn samples() -> Self {
        Self::new(Category::ALL.into_iter().map(Question::sample).collect())
    }
}

#[async_trait]
impl QuestionSource for StaticQuestionSource {
    async fn fetch(&self, category: Category) -> Result<QuestionDeck, FetchError> {
        Ok(self
            .questions
            .iter()
            .filter(|q| q.category == category)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingOn(Category);

    #[async_trait]
    impl QuestionSource for FailingOn {
        async fn fetch(&self, category: Category) -> Result<QuestionDeck, FetchError> {
            if category == self.0 {
                return Err(FetchError::Network("connection refused".to_string()));
            }
            Ok(QuestionDeck::new(vec![Question::sample(category)]))
        }
    }

    #[tokio::test]
    async fn samples_serve_one_question_per_category() {
        let source = StaticQuestionSource::samples();
        let deck = source.fetch(Category::Part1).await.unwrap();
        assert_eq!(deck.len(), 1);
        assert_eq!(
            deck.next(0).unwrap().content,
            "What do you do in your free time?"
        );
    }

    #[tokio::test]
    async fn full_test_concatenates_parts_in_order() {
        let source = StaticQuestionSource::samples();
        let deck = source
            .fetch_selection(PracticeSelection::FullTest)
            .await
            .unwrap();
        let categories: Vec<Category> = deck.iter().map(|q| q.category).collect();
        assert_eq!(categories, Category::ALL.to_vec());
    }

    #[tokio::test]
    async fn full_test_fails_when_any_part_fails() {
        let err = FailingOn(Category::Part2)
            .fetch_selection(PracticeSelection::FullTest)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
    }
}
