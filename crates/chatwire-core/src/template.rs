//! Turning values into chat messages.
//!
//! Anything that contributes messages to an outgoing request (the system
//! preamble, previous turns, the new user input) implements [`IntoPrompt`].
//! `chatwire-prompt`'s `PromptChain` lines those fragments up into the final
//! message list.
use crate::transcript::Message;

/// Converts a value into a series of chat messages.
pub trait IntoPrompt {
    /// Chat message representation emitted by the prompt.
    type Message: Send + Sync + 'static;

    /// Consume `self` and return **all** messages in the desired order.
    fn into_prompt(self) -> Vec<Self::Message>;
}

/// A single message can be chained directly.
impl IntoPrompt for Message {
    type Message = Message;

    fn into_prompt(self) -> Vec<Self::Message> {
        vec![self]
    }
}

/// Previous conversation turns, replayed in order.
impl IntoPrompt for &[Message] {
    type Message = Message;

    fn into_prompt(self) -> Vec<Self::Message> {
        self.to_vec()
    }
}
