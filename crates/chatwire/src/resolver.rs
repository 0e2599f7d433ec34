//! Credential validation and model selection.
//!
//! The UI edits a *draft* credential. Submitting it triggers exactly one
//! model-listing request; only when that succeeds does the draft become the
//! *active* credential, together with the filtered model list and a default
//! selection. A failed validation changes nothing except the draft.
use std::sync::Arc;

use chatwire_core::{
    credential::Credential,
    error::{ChatError, Result},
    model::ModelFamily,
    provider::ModelCatalogProvider,
};

pub struct CredentialResolver<P> {
    provider: Arc<P>,
    family: ModelFamily,
    draft: Option<Credential>,
    active: Option<Credential>,
    models: Vec<String>,
    selected: Option<String>,
}

impl<P> CredentialResolver<P>
where
    P: ModelCatalogProvider,
{
    pub fn new(provider: Arc<P>) -> Self {
        Self {
            provider,
            family: ModelFamily::default(),
            draft: None,
            active: None,
            models: Vec::new(),
            selected: None,
        }
    }

    pub fn with_family(mut self, family: ModelFamily) -> Self {
        self.family = family;
        self
    }

    pub fn set_draft(&mut self, credential: impl Into<Credential>) {
        self.draft = Some(credential.into());
    }

    pub fn draft(&self) -> Option<&Credential> {
        self.draft.as_ref()
    }

    pub fn active(&self) -> Option<&Credential> {
        self.active.as_ref()
    }

    /// Models of the configured family available to the active credential.
    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn selected_model(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Switch to another model from [`Self::models`].
    ///
    /// # Errors
    ///
    /// [`ChatError::Invalid`] if `id` is not in the list.
    pub fn select_model(&mut self, id: &str) -> Result<()> {
        if !self.models.iter().any(|model| model == id) {
            return Err(ChatError::Invalid(format!("model `{id}` is not available")));
        }
        self.selected = Some(id.to_string());
        Ok(())
    }

    /// Replace the draft and validate it in one go.
    pub async fn submit(&mut self, credential: impl Into<Credential>) -> Result<Option<String>> {
        self.set_draft(credential);
        self.validate().await
    }

    /// Validate the draft credential against the model listing.
    ///
    /// On success the draft is promoted, the model list replaced and the
    /// default model selected; the selection is returned (`None` if the
    /// family has no models).
    ///
    /// # Errors
    ///
    /// * [`ChatError::NotReady`] – no draft has been entered.
    /// * [`ChatError::CredentialInvalid`] – the listing failed; the active
    ///   credential, list and selection are left untouched.
    pub async fn validate(&mut self) -> Result<Option<String>> {
        let draft = self
            .draft
            .clone()
            .ok_or(ChatError::NotReady("no API key entered"))?;

        let ids = match self.provider.list_models(&draft).await {
            Ok(ids) => ids,
            Err(err) => {
                tracing::warn!(error = %err, "credential validation failed");
                return Err(ChatError::CredentialInvalid(Box::new(err)));
            }
        };

        let models = self.family.filter(ids);
        self.selected = self.family.default_model(&models);
        self.models = models;
        self.active = Some(draft);

        tracing::info!(
            models = self.models.len(),
            selected = self.selected.as_deref().unwrap_or(""),
            "credential validated"
        );
        Ok(self.selected.clone())
    }
}

#[cfg(test)]
mod tests {
    use chatwire_core::classify::{ErrorBody, Rejection, RejectionKind};

    use super::*;
    use crate::testing::ScriptedProvider;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn unauthorized() -> ChatError {
        ChatError::Rejected(Rejection::classify(
            401,
            ErrorBody {
                message: "Incorrect API key provided".into(),
                code: Some("invalid_api_key".into()),
            },
        ))
    }

    #[tokio::test]
    async fn success_promotes_draft_and_selects_default() {
        let provider = Arc::new(ScriptedProvider::with_catalog([Ok(ids(&[
            "gpt-4",
            "gpt-3.5-turbo",
            "text-davinci-003",
        ]))]));
        let mut resolver = CredentialResolver::new(Arc::clone(&provider));

        let selected = resolver.submit("sk-good").await.unwrap();

        assert_eq!(selected.as_deref(), Some("gpt-3.5-turbo"));
        assert_eq!(resolver.models(), ids(&["gpt-4", "gpt-3.5-turbo"]));
        assert_eq!(resolver.active(), Some(&Credential::new("sk-good")));
        assert_eq!(provider.validated(), [Credential::new("sk-good")]);
    }

    #[tokio::test]
    async fn failure_keeps_previous_active_state() {
        let provider = Arc::new(ScriptedProvider::with_catalog([
            Ok(ids(&["gpt-4"])),
            Err(unauthorized()),
        ]));
        let mut resolver = CredentialResolver::new(provider);
        resolver.submit("sk-good").await.unwrap();

        let err = resolver.submit("sk-typo").await.unwrap_err();

        assert!(matches!(err, ChatError::CredentialInvalid(_)));
        assert_eq!(err.rejection().unwrap().kind, RejectionKind::Generic);
        assert_eq!(resolver.active(), Some(&Credential::new("sk-good")));
        assert_eq!(resolver.draft(), Some(&Credential::new("sk-typo")));
        assert_eq!(resolver.models(), ids(&["gpt-4"]));
        assert_eq!(resolver.selected_model(), Some("gpt-4"));
    }

    #[tokio::test]
    async fn failure_without_previous_credential_leaves_nothing_active() {
        let provider = Arc::new(ScriptedProvider::with_catalog([Err(ChatError::Transport(
            "dns lookup failed".into(),
        ))]));
        let mut resolver = CredentialResolver::new(provider);

        assert!(resolver.submit("sk-x").await.is_err());
        assert_eq!(resolver.active(), None);
        assert!(resolver.models().is_empty());
        assert_eq!(resolver.selected_model(), None);
    }

    #[tokio::test]
    async fn every_submission_is_a_fresh_round_trip() {
        let provider = Arc::new(ScriptedProvider::with_catalog([
            Ok(ids(&["gpt-4"])),
            Ok(ids(&["gpt-4"])),
        ]));
        let mut resolver = CredentialResolver::new(Arc::clone(&provider));

        resolver.submit("sk-1").await.unwrap();
        resolver.submit("sk-1").await.unwrap();

        assert_eq!(provider.validated().len(), 2);
    }

    #[tokio::test]
    async fn no_family_models_means_no_selection() {
        let provider = Arc::new(ScriptedProvider::with_catalog([Ok(ids(&["whisper-1", "dall-e-3"]))]));
        let mut resolver = CredentialResolver::new(provider);

        let selected = resolver.submit("sk-1").await.unwrap();

        assert_eq!(selected, None);
        assert!(resolver.models().is_empty());
        assert!(resolver.active().is_some());
    }

    #[tokio::test]
    async fn lexicographically_last_without_preferred_model() {
        let provider = Arc::new(ScriptedProvider::with_catalog([Ok(ids(&["gpt-4o", "gpt-4", "gpt-4-turbo"]))]));
        let mut resolver = CredentialResolver::new(provider);

        assert_eq!(resolver.submit("sk-1").await.unwrap().as_deref(), Some("gpt-4o"));
    }

    #[tokio::test]
    async fn validate_without_draft_is_not_ready() {
        let mut resolver = CredentialResolver::new(Arc::new(ScriptedProvider::default()));
        assert!(matches!(resolver.validate().await, Err(ChatError::NotReady(_))));
    }

    #[tokio::test]
    async fn selection_is_constrained_to_the_list() {
        let provider = Arc::new(ScriptedProvider::with_catalog([Ok(ids(&["gpt-4", "gpt-3.5-turbo"]))]));
        let mut resolver = CredentialResolver::new(provider);
        resolver.submit("sk-1").await.unwrap();

        resolver.select_model("gpt-4").unwrap();
        assert_eq!(resolver.selected_model(), Some("gpt-4"));
        assert!(resolver.select_model("claude-3").is_err());
        assert_eq!(resolver.selected_model(), Some("gpt-4"));
    }
}
