//! Line-oriented builder for system prompt text.
//!
//! ```rust
//! use chatwire_prompt::builder::PromptBuilder;
//!
//! let text = PromptBuilder::new()
//!     .add_line("You are a helpful assistant.")
//!     .add_key_value("Current Date", "2024-05-01")
//!     .finalize();
//!
//! assert_eq!(text, "You are a helpful assistant.\n**Current Date**: 2024-05-01");
//! ```
//!
//! Whitespace is emitted exactly as requested; the only normalisation is that
//! [`PromptBuilder::finalize`] drops the trailing newline.

use std::fmt::{Display, Write as _};

/// Fluent helper owning a growing `String` buffer.
#[derive(Debug, Default)]
pub struct PromptBuilder {
    buffer: String,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plain line of text and a trailing newline.
    pub fn add_line(mut self, line: impl Display) -> Self {
        // Writing into a String cannot fail.
        let _ = writeln!(self.buffer, "{line}");
        self
    }

    /// Add a key–value pair with the key in bold: `**Key**: Value`
    pub fn add_key_value(mut self, key: impl Display, value: impl Display) -> Self {
        let _ = writeln!(self.buffer, "**{key}**: {value}");
        self
    }

    /// Retrieve the accumulated text without its final newline.
    pub fn finalize(mut self) -> String {
        if self.buffer.ends_with('\n') {
            self.buffer.pop();
        }
        self.buffer
    }
}
