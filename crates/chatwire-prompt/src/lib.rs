//! Helpers for assembling the message list of a completion request.
pub mod builder;
pub mod chain;
