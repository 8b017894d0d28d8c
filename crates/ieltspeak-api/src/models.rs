//! Internal API response types for the practice service.
//!
//! These types never leave the crate; callers see the core domain types.

use std::time::Duration;

use ieltspeak_core::{Category, Question, QuestionDeck};
use serde::Deserialize;
use url::Url;

#[cfg(test)]
use crate::config::DEFAULT_BASE_URL;
use crate::config::PracticeApiConfig;
use crate::error::{ApiError, ApiResult};

// ============================================================================
// Configuration (used internally, see config.rs for public config)
// ============================================================================

/// Internal configuration for the practice client.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL, always ending in `/` so relative joins keep its path
    pub base_url: Url,
    pub user_agent: String,
    pub timeout: Duration,
    pub max_retries: u8,
    /// Base delay in milliseconds for exponential backoff (default: 500)
    pub retry_base_delay_ms: u64,
    pub max_audio_bytes: usize,
}

impl ApiConfig {
    pub fn from_public(config: &PracticeApiConfig) -> ApiResult<Self> {
        Ok(Self {
            base_url: parse_base_url(&config.base_url)?,
            user_agent: config.user_agent.clone(),
            timeout: config.timeout,
            max_retries: config.max_retries,
            retry_base_delay_ms: u64::try_from(config.retry_base_delay.as_millis())
                .unwrap_or(u64::MAX),
            max_audio_bytes: config.max_audio_bytes,
        })
    }
}

#[cfg(test)]
impl Default for ApiConfig {
    fn default() -> Self {
        let public = PracticeApiConfig::default();
        Self {
            base_url: parse_base_url(DEFAULT_BASE_URL).expect("default base URL is valid"),
            user_agent: public.user_agent,
            timeout: public.timeout,
            max_retries: public.max_retries,
            retry_base_delay_ms: 500,
            max_audio_bytes: public.max_audio_bytes,
        }
    }
}

fn parse_base_url(raw: &str) -> ApiResult<Url> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(&format!("{trimmed}/"))?;
    if url.cannot_be_a_base() {
        return Err(ApiError::InvalidResponse {
            message: format!("'{raw}' cannot be used as a base URL"),
        });
    }
    Ok(url)
}

// ============================================================================
// Question DTOs
// ============================================================================

/// Topic as sent by the service: a plain title or a populated document.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TopicField {
    Title(String),
    Document {
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        name: Option<String>,
    },
}

impl TopicField {
    pub(crate) fn into_title(self) -> Option<String> {
        match self {
            Self::Title(title) => Some(title),
            Self::Document { title, name } => title.or(name),
        }
    }
}

/// One question as returned by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionDto {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub topic: Option<TopicField>,
}

impl QuestionDto {
    /// Convert to a domain question, falling back to the requested category
    /// when the service omits or misspells it.
    pub fn into_question(self, requested: Category) -> Question {
        let category = self
            .category
            .as_deref()
            .and_then(|c| c.parse().ok())
            .unwrap_or(requested);

        Question {
            id: self.id,
            content: self.content,
            category,
            topic: self
                .topic
                .and_then(TopicField::into_title)
                .unwrap_or_else(|| "General".to_string()),
        }
    }
}

/// A list endpoint's body: a bare array or an envelope with a `data` array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListResponse<T> {
    Bare(Vec<T>),
    Envelope { data: Vec<T> },
}

impl<T> ListResponse<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Bare(items) | Self::Envelope { data: items } => items,
        }
    }
}

/// A single-item body: the item itself or an envelope with `data`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ItemResponse<T> {
    Envelope { data: T },
    Bare(T),
}

impl<T> ItemResponse<T> {
    pub fn into_inner(self) -> T {
        match self {
            Self::Envelope { data: item } | Self::Bare(item) => item,
        }
    }
}

/// Build a deck from a list response.
pub fn deck_from_list(list: ListResponse<QuestionDto>, requested: Category) -> QuestionDeck {
    list.into_vec()
        .into_iter()
        .map(|dto| dto.into_question(requested))
        .collect()
}
