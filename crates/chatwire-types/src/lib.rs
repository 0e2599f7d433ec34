//! Reusable prompt fragments for chatwire.
pub mod clock;
pub mod fragments;
