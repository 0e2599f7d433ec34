use std::{future::Future, pin::Pin};

use futures_core::stream::Stream;
use serde::Serialize;

use crate::{credential::Credential, error::Result, transcript::Message};

/// Stream of UTF-8 text deltas, in the order the provider parsed them.
pub type DeltaStream<'s> = Pin<Box<dyn Stream<Item = Result<String>> + Send + 's>>;

/// A **backend** that delivers a chat completion incrementally.
///
/// Opening a stream is split in two phases so the caller can tell them apart:
///
/// * the returned future resolves once the response status is known. A
///   non-success status resolves to [`crate::error::ChatError::Rejected`]
///   before any delta is produced;
/// * the [`DeltaStream`] then yields text fragments until the transport
///   signals end-of-stream. An `Err` item means the connection dropped.
///
/// The method returns a [`Pin<Box<dyn Future>>`] so we stay object-safe
/// without pulling in `async_trait`.
pub trait StreamingChatProvider: Send + Sync {
    fn open_chat_stream<'s>(
        &'s self,
        credential: &'s Credential,
        request: ChatRequest,
    ) -> Pin<Box<dyn Future<Output = Result<DeltaStream<'s>>> + Send + 's>>;
}

/// Provider-agnostic description of one completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub stream: bool,
}

impl ChatRequest {
    /// A streaming request; the engine never issues anything else.
    pub fn streaming(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            stream: true,
        }
    }
}
