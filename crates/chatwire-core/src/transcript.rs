//! Message, role and transcript types.
//!
//! The transcript is the conversation state replayed to the remote endpoint on
//! every request. Its invariants are enforced by the mutators below rather
//! than by convention:
//!
//! * exactly one system message exists and it is always at index 0,
//! * everything after it is append-only,
//! * only the trailing assistant message may grow, and only by appending.
//!
//! Callers that merely render the conversation receive clones (snapshots) and
//! can do whatever they like with them without affecting the engine's copy.
use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::error::{ChatError, Result};

/// A single conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Field order mirrors the common HTTP APIs (`role`, then `content`).
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Chat roles understood by the completion endpoint.
///
/// `Display` renders the lowercase wire name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// Ordered conversation history headed by a single system message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Start a conversation consisting of just the system message.
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system_prompt)],
        }
    }

    /// All messages, system message first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn system(&self) -> &Message {
        &self.messages[0]
    }

    /// Every message after the system message, in conversation order.
    pub fn history(&self) -> &[Message] {
        &self.messages[1..]
    }

    /// Number of messages, system message included; never zero.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// `true` once anything besides the system message is present.
    pub fn has_history(&self) -> bool {
        self.messages.len() > 1
    }

    pub fn last(&self) -> &Message {
        // index 0 always exists
        &self.messages[self.messages.len() - 1]
    }

    /// Replace the system message content. It embeds the current date and is
    /// therefore rebuilt on every send.
    pub fn replace_system(&mut self, content: impl Into<String>) {
        self.messages[0].content = content.into();
    }

    /// Append a finished user or assistant message.
    ///
    /// # Errors
    ///
    /// [`ChatError::Invalid`] when asked to append a second system message.
    pub fn push(&mut self, message: Message) -> Result<()> {
        if message.role == Role::System {
            return Err(ChatError::Invalid(
                "transcript already has a system message".into(),
            ));
        }
        self.messages.push(message);
        Ok(())
    }

    /// Open an empty assistant message that subsequent deltas grow.
    pub fn begin_reply(&mut self) {
        self.messages.push(Message::assistant(String::new()));
    }

    /// Append a streamed delta to the trailing assistant message.
    ///
    /// # Errors
    ///
    /// [`ChatError::Invalid`] if the transcript does not end in an assistant
    /// message, i.e. no reply has been opened with [`Self::begin_reply`].
    pub fn append_to_reply(&mut self, delta: &str) -> Result<()> {
        let last = self
            .messages
            .last_mut()
            .filter(|message| message.role == Role::Assistant)
            .ok_or_else(|| ChatError::Invalid("no assistant reply in progress".into()))?;
        last.content.push_str(delta);
        Ok(())
    }
}
