//! # `chatwire` – streaming chat over hosted completion APIs
//!
//! The umbrella crate re-exports the building blocks and adds the engine
//! that ties them together:
//!
//! | Crate / module          | What it provides                                                       |
//! |-------------------------|------------------------------------------------------------------------|
//! | **`chatwire-core`**     | Transcript model, credentials, model family rules, errors, provider traits |
//! | **`chatwire-prompt`**   | `PromptBuilder` and `PromptChain` for assembling messages               |
//! | **`chatwire-types`**    | Date-stamped `SystemPreamble`, `StaticFragment`, `Clock`               |
//! | **`chatwire-openai`**   | `reqwest` backend for OpenAI-compatible endpoints *(feature `openai`)* |
//! | [`request`]             | Builds the outbound request from transcript + new input                |
//! | [`session`]             | The single-flight streaming state machine                              |
//! | [`resolver`]            | Draft/active credential handling and model selection                   |
//! | [`ChatClient`]          | Both of the above over one backend, for a UI to hold                   |
//!
//! See `examples/openai_terminal_chat.rs` for a complete terminal client.
pub use chatwire_core::*;
pub use chatwire_prompt as prompt;
pub use chatwire_types as types;

#[cfg(feature = "openai")]
pub use chatwire_openai as openai;

mod client;
pub mod request;
pub mod resolver;
pub mod session;

#[cfg(test)]
mod testing;

pub use client::ChatClient;
