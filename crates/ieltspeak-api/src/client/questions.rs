//! Question and topic lookups.

use async_trait::async_trait;
use ieltspeak_core::{Category, FetchError, Question, QuestionDeck, QuestionSource};

use crate::error::ApiResult;
use crate::http::HttpBackend;
use crate::models::{ItemResponse, ListResponse, QuestionDto, TopicField, deck_from_list};
use crate::url::{build_question_url, build_questions_url, build_topics_url};

use super::PracticeClient;

impl<B: HttpBackend> PracticeClient<B> {
    async fn fetch_deck(&self, category: Category) -> ApiResult<QuestionDeck> {
        let url = build_questions_url(&self.config, category)?;
        let list: ListResponse<QuestionDto> = self.backend.get_json(&url).await?;
        let deck = deck_from_list(list, category);
        tracing::info!(%category, count = deck.len(), "Fetched practice questions");
        Ok(deck)
    }

    /// Look up a single question by its server id.
    pub async fn fetch_question(&self, id: &str) -> Result<Question, FetchError> {
        let url = build_question_url(&self.config, id)?;
        let item: ItemResponse<QuestionDto> = self.backend.get_json(&url).await?;
        let dto = item.into_inner();
        let category = dto
            .category
            .as_deref()
            .and_then(|c| c.parse().ok())
            .ok_or_else(|| FetchError::Malformed(format!("question '{id}' has no category")))?;
        Ok(dto.into_question(category))
    }

    /// Topic titles available for a category.
    pub async fn fetch_topics(&self, category: Category) -> Result<Vec<String>, FetchError> {
        let url = build_topics_url(&self.config, category)?;
        let list: ListResponse<TopicField> = self.backend.get_json(&url).await?;
        Ok(list
            .into_vec()
            .into_iter()
            .filter_map(TopicField::into_title)
            .collect())
    }
}

#[async_trait]
impl<B: HttpBackend> QuestionSource for PracticeClient<B> {
    async fn fetch(&self, category: Category) -> Result<QuestionDeck, FetchError> {
        self.fetch_deck(category).await.map_err(|e| {
            tracing::warn!(%category, error = %e, "Question fetch failed");
            FetchError::from(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::{CannedResponse, FakeBackend};
    use crate::models::ApiConfig;
    use ieltspeak_core::PracticeSelection;
    use serde_json::json;

    fn client(backend: FakeBackend) -> PracticeClient<FakeBackend> {
        PracticeClient::with_backend(ApiConfig::default(), backend)
    }

    #[tokio::test]
    async fn test_fetch_preserves_server_order() {
        let backend = FakeBackend::new().with_response(
            "questions?category=PART1",
            CannedResponse::Json(json!([
                {"_id": "1", "content": "First?", "category": "PART1", "topic": "Home"},
                {"_id": "2", "content": "Second?", "category": "PART1", "topic": "Home"}
            ])),
        );
        let deck = client(backend).fetch(Category::Part1).await.unwrap();
        let contents: Vec<&str> = deck.iter().map(|q| q.content.as_str()).collect();
        assert_eq!(contents, ["First?", "Second?"]);
    }

    #[tokio::test]
    async fn test_fetch_maps_server_error() {
        let backend = FakeBackend::new().with_response("questions", CannedResponse::Status(500));
        let err = client(backend).fetch(Category::Part2).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_fetch_maps_malformed_body() {
        let backend = FakeBackend::new()
            .with_response("questions", CannedResponse::Json(json!({"unexpected": true})));
        let err = client(backend).fetch(Category::Part1).await.unwrap_err();
        assert!(matches!(err, FetchError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_full_test_requests_every_part_in_order() {
        let backend = FakeBackend::new()
            .with_response("PART1", CannedResponse::Json(json!([{"content": "One"}])))
            .with_response("PART2", CannedResponse::Json(json!([{"content": "Two"}])))
            .with_response("PART3", CannedResponse::Json(json!([{"content": "Three"}])));
        let client = client(backend);

        let deck = client
            .fetch_selection(PracticeSelection::FullTest)
            .await
            .unwrap();

        assert_eq!(deck.len(), 3);
        assert_eq!(deck.next(2).unwrap().category, Category::Part3);
        let requests = client.backend.requests();
        assert!(requests[0].ends_with("category=PART1"));
        assert!(requests[2].ends_with("category=PART3"));
    }

    #[tokio::test]
    async fn test_fetch_question_by_id() {
        let backend = FakeBackend::new().with_response(
            "question/abc",
            CannedResponse::Json(json!({"data": {"_id": "abc", "content": "Why?", "category": "PART3"}})),
        );
        let question = client(backend).fetch_question("abc").await.unwrap();
        assert_eq!(question.category, Category::Part3);
        assert_eq!(question.content, "Why?");
    }

    #[tokio::test]
    async fn test_fetch_topics() {
        let backend = FakeBackend::new().with_response(
            "topics",
            CannedResponse::Json(json!([{"title": "Travel"}, "Food", {"other": 1}])),
        );
        let topics = client(backend).fetch_topics(Category::Part1).await.unwrap();
        assert_eq!(topics, ["Travel", "Food"]);
    }
}
