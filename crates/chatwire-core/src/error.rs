//! Unified error type exposed by **`chatwire-core`**.
//!
//! Provider crates convert their internal errors into one of these variants
//! before bubbling them up to the engine. The variants line up with the
//! failure categories a user can actually observe:
//!
//! * [`ChatError::Transport`] – the network gave up before or during a stream,
//! * [`ChatError::Rejected`] – the endpoint answered with a non-success status,
//!   already classified by [`crate::classify::Rejection::classify`],
//! * [`ChatError::CredentialInvalid`] – a validation round-trip failed.
//!
//! Malformed stream records never show up here; the decoder skips them.

use thiserror::Error;

use crate::classify::Rejection;

/// Convenient alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, ChatError>;

#[derive(Debug, Error)]
pub enum ChatError {
    /// Connection-level failure (DNS, TLS, reset, body read error …). No
    /// partial body is guaranteed.
    #[error("transport failure: {0}")]
    Transport(Box<dyn std::error::Error + Send + Sync + 'static>),

    /// The endpoint returned a non-success status.
    #[error("request rejected: {0}")]
    Rejected(Rejection),

    /// The draft credential could not be validated against the model listing.
    #[error("credential could not be validated: {0}")]
    CredentialInvalid(#[source] Box<ChatError>),

    /// Failure while serialising or deserialising JSON payloads sent to /
    /// received from the provider.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A precondition for sending is missing (no active credential or no
    /// model selected).
    #[error("not ready: {0}")]
    NotReady(&'static str),

    #[error("invalid: {0}")]
    Invalid(String),
}

impl ChatError {
    /// Text suitable for a notification shown to the user.
    ///
    /// Rejections carry their own classified wording; transport failures get
    /// a generic message because the underlying error is rarely actionable.
    pub fn user_message(&self) -> String {
        match self {
            ChatError::Rejected(rejection) => rejection.user_message(),
            ChatError::Transport(_) => {
                "Could not reach the chat service. Check your connection and try again.".into()
            }
            ChatError::CredentialInvalid(_) => {
                "The API key could not be validated. Check the key and try again.".into()
            }
            ChatError::NotReady(what) => format!("Not ready to send: {what}."),
            ChatError::Serialization(_) | ChatError::Invalid(_) => {
                "Something went wrong while talking to the chat service.".into()
            }
        }
    }

    /// Classification of a rejection, if this error is one.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            ChatError::Rejected(rejection) => Some(rejection),
            ChatError::CredentialInvalid(inner) => inner.rejection(),
            _ => None,
        }
    }
}
