use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::error::FetchError;
use crate::item::QuizItem;

/// Anything that can hand out an ordered batch of questions.
pub trait QuestionSource: Send + Sync {
    /// Return at most `limit` questions; `0` means no limit.
    fn fetch(&self, limit: usize) -> Result<Vec<QuizItem>, FetchError>;
}

#[derive(Debug, Deserialize)]
struct QuizResponse {
    #[serde(default)]
    items: Vec<QuizItem>,
}

/// Question source backed by the `/api/quiz` endpoint of a quiz server.
#[derive(Debug, Clone)]
pub struct HttpQuestionSource {
    client: Client,
    base_url: String,
}

impl HttpQuestionSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Transport)?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/api/quiz", self.base_url.trim_end_matches('/'))
    }
}

impl QuestionSource for HttpQuestionSource {
    fn fetch(&self, limit: usize) -> Result<Vec<QuizItem>, FetchError> {
        let url = self.endpoint();
        tracing::debug!(%url, limit, "requesting questions");

        let response = self
            .client
            .get(&url)
            .query(&[("limit", limit)])
            .send()
            .map_err(FetchError::Transport)?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let body: QuizResponse = response.json().map_err(FetchError::Decode)?;
        tracing::info!(count = body.items.len(), "questions received");
        Ok(body.items)
    }
}

/// Fixed in-memory question list.
#[derive(Debug, Clone, Default)]
pub struct StaticQuestionSource {
    items: Vec<QuizItem>,
}

impl StaticQuestionSource {
    pub fn new(items: Vec<QuizItem>) -> Self {
        Self { items }
    }
}

impl QuestionSource for StaticQuestionSource {
    fn fetch(&self, limit: usize) -> Result<Vec<QuizItem>, FetchError> {
        let take = if limit == 0 { self.items.len() } else { limit };
        Ok(self.items.iter().take(take).cloned().collect())
    }
}
