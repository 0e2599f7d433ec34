use serde::Deserialize;

use super::chat_completion::MessageRole;

/// A delta message as returned when `stream = true`.
#[allow(dead_code)]
#[derive(Debug, Deserialize)]
pub struct ChatCompletionMessageDelta {
    #[serde(default)]
    pub role: Option<MessageRole>,
    #[serde(default)]
    pub content: Option<String>,
}

/// A single streaming choice payload.
#[allow(dead_code)]
#[derive(Debug, Deserialize)]
pub struct ChatCompletionChunkChoice {
    #[serde(default)]
    pub index: i64,
    pub delta: ChatCompletionMessageDelta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// The object carried by each `data: ` record.
///
/// Only `choices` is required; the bookkeeping fields differ between
/// OpenAI-compatible servers and are optional here.
#[allow(dead_code)]
#[derive(Debug, Deserialize)]
pub struct ChatCompletionChunkResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub model: Option<String>,
    pub choices: Vec<ChatCompletionChunkChoice>,
}

impl ChatCompletionChunkResponse {
    /// `choices[0].delta.content`, if present and non-empty.
    pub fn content_delta(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta.content)
            .filter(|content| !content.is_empty())
    }
}
