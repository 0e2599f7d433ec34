//! Classification of non-success responses into the categories the UI
//! distinguishes.
//!
//! The classifier is a pure function of the HTTP status and the parsed
//! error body. It never touches the transcript; rolling back the user turn is
//! the engine's job.

use std::fmt::Display;

/// Error code OpenAI-compatible endpoints put into `error.code` when the
/// prompt exceeds the model's context window.
pub const CONTEXT_LENGTH_EXCEEDED: &str = "context_length_exceeded";

const STATUS_TOO_MANY_REQUESTS: u16 = 429;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    /// The conversation no longer fits into the model's context.
    ContextLengthExceeded,
    /// HTTP 429: request rate or billing quota exhausted.
    RateLimited,
    /// Anything else; the remote message is shown verbatim.
    Generic,
}

/// The `error` object of a non-success response body, reduced to the fields
/// the classifier looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorBody {
    pub message: String,
    pub code: Option<String>,
}

/// A classified remote rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub kind: RejectionKind,
    pub status: u16,
    pub message: String,
    pub code: Option<String>,
}

impl Rejection {
    /// Categorise a non-success response.
    ///
    /// The error code wins over the status: a context overflow reported with
    /// 429 is still a context overflow.
    pub fn classify(status: u16, body: ErrorBody) -> Self {
        let kind = if body.code.as_deref() == Some(CONTEXT_LENGTH_EXCEEDED) {
            RejectionKind::ContextLengthExceeded
        } else if status == STATUS_TOO_MANY_REQUESTS {
            RejectionKind::RateLimited
        } else {
            RejectionKind::Generic
        };

        Self {
            kind,
            status,
            message: body.message,
            code: body.code,
        }
    }

    pub fn user_message(&self) -> String {
        match self.kind {
            RejectionKind::ContextLengthExceeded => {
                "This conversation has grown too long for the selected model. \
                 Shorten your message or start a new conversation."
                    .into()
            }
            RejectionKind::RateLimited => {
                "Too many requests, or your account has run into a billing limit. \
                 Wait a moment and check your plan before trying again."
                    .into()
            }
            RejectionKind::Generic if self.message.is_empty() => {
                format!("The chat service returned status {}.", self.status)
            }
            RejectionKind::Generic => self.message.clone(),
        }
    }
}

impl Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} (status {}): {}", self.kind, self.status, self.message)
    }
}
