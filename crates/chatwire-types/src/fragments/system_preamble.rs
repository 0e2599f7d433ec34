//! The system message that heads every request.
//!
//! It carries the assistant instructions plus the current UTC date, so the
//! model can resolve expressions like "yesterday" or "next Friday":
//!
//! ```markdown
//! You are a helpful assistant. Answer as concisely as possible.
//! **Current Date**: 2024-04-20
//! **Timezone**: UTC
//! ```
//!
//! Only the date is embedded, never the time of day: two sends on the same
//! day produce byte-identical system messages, two sends a day apart do not.
//!
//! ```rust
//! use chatwire_types::fragments::SystemPreamble;
//! use chrono::NaiveDate;
//!
//! let date = NaiveDate::from_ymd_opt(2024, 4, 20).unwrap();
//! let preamble = SystemPreamble::new("Be brief.", date);
//! assert!(preamble.text().contains("2024-04-20"));
//! ```

use chatwire_core::{template::IntoPrompt, transcript::Message};
use chatwire_prompt::builder::PromptBuilder;
use chrono::NaiveDate;

pub const DEFAULT_INSTRUCTIONS: &str =
    "You are a helpful assistant. Answer as concisely as possible.";

/// Date-stamped system message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemPreamble {
    instructions: String,
    date: NaiveDate,
}

impl SystemPreamble {
    pub fn new(instructions: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            instructions: instructions.into(),
            date,
        }
    }

    /// Preamble with [`DEFAULT_INSTRUCTIONS`].
    pub fn for_date(date: NaiveDate) -> Self {
        Self::new(DEFAULT_INSTRUCTIONS, date)
    }

    pub fn text(&self) -> String {
        PromptBuilder::new()
            .add_line(&self.instructions)
            .add_key_value("Current Date", self.date.format("%Y-%m-%d"))
            .add_key_value("Timezone", "UTC")
            .finalize()
    }
}

impl IntoPrompt for SystemPreamble {
    type Message = Message;

    fn into_prompt(self) -> Vec<Self::Message> {
        vec![Message::system(self.text())]
    }
}
