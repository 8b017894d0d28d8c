//! URL construction helpers for the practice API.

use ieltspeak_core::Category;
use url::Url;

use crate::error::ApiResult;
use crate::models::ApiConfig;

/// Build the question list URL for one category.
pub fn build_questions_url(config: &ApiConfig, category: Category) -> ApiResult<Url> {
    let mut url = config.base_url.join("practice-questions/questions")?;
    url.set_query(Some(&format!("category={}", category.as_api_param())));
    Ok(url)
}

/// Build the single-question URL.
pub fn build_question_url(config: &ApiConfig, id: &str) -> ApiResult<Url> {
    Ok(config
        .base_url
        .join(&format!("practice-questions/question/{}", urlencoding::encode(id)))?)
}

/// Build the topic list URL for one category.
pub fn build_topics_url(config: &ApiConfig, category: Category) -> ApiResult<Url> {
    let mut url = config.base_url.join("practice-questions/topics")?;
    url.set_query(Some(&format!("category={}", category.as_api_param())));
    Ok(url)
}

/// Build the speech stream URL for `text`.
pub fn build_audio_stream_url(config: &ApiConfig, text: &str) -> ApiResult<Url> {
    let mut url = config.base_url.join("audio/stream")?;
    url.set_query(Some(&format!("text={}", urlencoding::encode(text))));
    Ok(url)
}
