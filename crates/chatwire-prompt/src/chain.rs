//! Concatenates values implementing [`IntoPrompt`] into one message list.
//!
//! An outgoing completion request is assembled from three fragments, always in
//! the same order:
//!
//! ```text
//! SystemPreamble  ──► [system]
//! history         ──► [user, assistant, user, …]
//! new user input  ──► [user]
//! ```
//!
//! ```rust
//! use chatwire_core::transcript::Message;
//! use chatwire_prompt::chain::PromptChain;
//!
//! let history = vec![Message::user("hi"), Message::assistant("hello")];
//! let messages = PromptChain::new()
//!     .with(Message::system("be brief"))
//!     .with(history.as_slice())
//!     .with(Message::user("how are you?"))
//!     .build();
//!
//! assert_eq!(messages.len(), 4);
//! ```
use chatwire_core::template::IntoPrompt;

/// Accumulates messages produced by [`IntoPrompt`] implementors.
///
/// The field is private so the only way to obtain the result is
/// [`Self::build`].
pub struct PromptChain<Message>(Vec<Message>);

impl<Message> Default for PromptChain<Message> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Message> PromptChain<Message> {
    pub fn new() -> Self {
        Self(vec![])
    }

    /// Append the messages produced by `with` to the chain.
    pub fn with(mut self, with: impl IntoPrompt<Message = Message>) -> Self {
        self.0.append(&mut with.into_prompt());
        self
    }

    /// Consume the chain and return the accumulated messages.
    pub fn build(self) -> Vec<Message> {
        self.0
    }
}
