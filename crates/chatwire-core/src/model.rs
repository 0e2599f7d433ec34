//! Model family filtering and default model selection.
//!
//! The remote catalogue lists far more models than a chat client can use.
//! [`ModelFamily`] narrows it down to ids containing a naming prefix and
//! picks a deterministic default:
//!
//! 1. the family's preferred (fast-tier) id, if listed,
//! 2. otherwise the lexicographically last id,
//! 3. otherwise nothing.
//!
//! ```rust
//! use chatwire_core::model::ModelFamily;
//!
//! let family = ModelFamily::default();
//! let models = family.filter(["gpt-4", "gpt-3.5-turbo", "text-davinci-003"]);
//! assert_eq!(models, ["gpt-4", "gpt-3.5-turbo"]);
//! assert_eq!(family.default_model(&models).as_deref(), Some("gpt-3.5-turbo"));
//! ```

pub const GPT_FAMILY_PREFIX: &str = "gpt";
pub const GPT_3_5_TURBO: &str = "gpt-3.5-turbo";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFamily {
    prefix: String,
    preferred: String,
}

impl Default for ModelFamily {
    fn default() -> Self {
        Self::new(GPT_FAMILY_PREFIX, GPT_3_5_TURBO)
    }
}

impl ModelFamily {
    pub fn new(prefix: impl Into<String>, preferred: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            preferred: preferred.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn preferred(&self) -> &str {
        &self.preferred
    }

    /// Keep the ids containing the family prefix, preserving catalogue order.
    pub fn filter<I, S>(&self, ids: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ids.into_iter()
            .map(Into::into)
            .filter(|id| id.contains(self.prefix.as_str()))
            .collect()
    }

    /// Pick the default model from an already filtered list.
    pub fn default_model(&self, models: &[String]) -> Option<String> {
        if models.iter().any(|id| *id == self.preferred) {
            return Some(self.preferred.clone());
        }
        models.iter().max().cloned()
    }
}
