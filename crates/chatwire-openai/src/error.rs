use chatwire_core::{classify::Rejection, error::ChatError};
use reqwest::StatusCode;

use crate::api_v1::ErrorEnvelope;

/// Every failure mode the HTTP client can hit.
#[derive(Debug, thiserror::Error)]
pub enum OpenAiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("couldn’t serialise body: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("endpoint returned non-success status {status}: {body}")]
    Api { status: StatusCode, body: String },

    #[error("format error: {0}")]
    Format(String),
}

/// Non-success responses are classified here, at the provider boundary, so
/// the engine only ever sees a [`Rejection`].
impl From<OpenAiError> for ChatError {
    fn from(value: OpenAiError) -> Self {
        match value {
            OpenAiError::Http(err) => ChatError::Transport(Box::new(err)),
            OpenAiError::Serde(err) => ChatError::Serialization(err),
            OpenAiError::Api { status, body } => {
                ChatError::Rejected(Rejection::classify(status.as_u16(), ErrorEnvelope::parse(&body)))
            }
            OpenAiError::Format(msg) => ChatError::Invalid(msg),
        }
    }
}
