//! Provider-agnostic building blocks of the chatwire conversation engine:
//! the transcript model, credentials, model selection rules, the error
//! taxonomy with its rejection classifier, and the traits a backend
//! implements.
pub mod classify;
pub mod credential;
pub mod error;
pub mod model;
pub mod provider;
pub mod template;
pub mod transcript;
