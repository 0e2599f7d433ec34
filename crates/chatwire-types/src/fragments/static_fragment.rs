//! A fragment that injects a fixed piece of text with a given role.
//!
//! ```rust
//! use chatwire_types::fragments::StaticFragment;
//! use chatwire_core::{template::IntoPrompt, transcript::Role};
//!
//! let messages = StaticFragment::new("What time is it in Tokyo?", Role::User).into_prompt();
//! assert_eq!(messages[0].role, Role::User);
//! ```
//!
//! The text is passed through untouched, including the empty string.
//! Rejecting empty input is left to whoever collects it.

use chatwire_core::{
    template::IntoPrompt,
    transcript::{Message, Role},
};

/// A borrowed string bundled with a chat role.
pub struct StaticFragment<'a>((&'a str, Role));

/// Defaults to **user**, the role of free-form input.
impl<'a> From<&'a str> for StaticFragment<'a> {
    fn from(value: &'a str) -> Self {
        Self((value, Role::User))
    }
}

impl<'a> StaticFragment<'a> {
    pub fn new(value: &'a str, role: Role) -> Self {
        Self((value, role))
    }
}

impl IntoPrompt for StaticFragment<'_> {
    type Message = Message;

    fn into_prompt(self) -> Vec<Self::Message> {
        vec![Message::new(self.0.1, self.0.0)]
    }
}
