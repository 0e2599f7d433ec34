//! Completion request assembly.
//!
//! A request is always built from scratch:
//!
//! 1. a freshly rendered [`SystemPreamble`] (today's date),
//! 2. every non-system message of the transcript, in order,
//! 3. the new user text, untouched (empty input included),
//!
//! with streaming switched on. The transcript's own system message is never
//! reused.
use chatwire_core::{
    provider::ChatRequest,
    transcript::{Role, Transcript},
};
use chatwire_prompt::chain::PromptChain;
use chatwire_types::fragments::{StaticFragment, SystemPreamble};

pub fn build_request(
    model: &str,
    transcript: &Transcript,
    user_text: &str,
    preamble: SystemPreamble,
) -> ChatRequest {
    let messages = PromptChain::new()
        .with(preamble)
        .with(transcript.history())
        .with(StaticFragment::new(user_text, Role::User))
        .build();

    ChatRequest::streaming(model, messages)
}
