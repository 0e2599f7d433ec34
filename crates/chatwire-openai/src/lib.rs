//! OpenAI-compatible backend for chatwire: a thin `reqwest` client for the
//! streaming `chat/completions` and `models` endpoints, plus the incremental
//! decoder for the streamed body.
mod adapter;
mod client;
mod provider_impl_chat_stream;
mod provider_impl_models;

pub mod api_v1;
pub mod error;
pub mod sse;

pub use adapter::{BASE_URL_ENV, OpenAiAdapter, OpenAiAdapterBuilder};
pub use client::{DEFAULT_BASE_URL, OpenAiClient, OpenAiDeltaStream};
