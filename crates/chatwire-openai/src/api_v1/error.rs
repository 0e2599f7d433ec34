use chatwire_core::classify::ErrorBody;
use serde::Deserialize;

/// Body of a non-success response: `{"error": {"message": …, "code": …}}`.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ApiErrorObject,
}

#[allow(dead_code)]
#[derive(Debug, Deserialize)]
pub struct ApiErrorObject {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl ErrorEnvelope {
    /// Parse a raw error body. Anything that is not the expected envelope is
    /// surfaced with the raw text as the message.
    pub fn parse(raw: &str) -> ErrorBody {
        match serde_json::from_str::<ErrorEnvelope>(raw) {
            Ok(envelope) => ErrorBody {
                message: envelope.error.message,
                code: envelope.error.code,
            },
            Err(_) => ErrorBody {
                message: raw.trim().to_string(),
                code: None,
            },
        }
    }
}
