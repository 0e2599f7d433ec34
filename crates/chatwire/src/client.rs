//! The state container handed to a UI.
//!
//! [`ChatClient`] bundles one [`CredentialResolver`] and one [`Session`] over
//! the same backend. The UI talks to it through a handful of transitions and
//! reads transcript snapshots back; it never touches the state directly.
//!
//! ```rust,no_run
//! # #[cfg(feature = "openai")]
//! # async fn demo() -> chatwire::error::Result<()> {
//! use chatwire::{ChatClient, openai::OpenAiAdapterBuilder};
//!
//! let backend = OpenAiAdapterBuilder::new_from_env().build()?;
//! let mut client = ChatClient::new(backend);
//!
//! client.submit_credential("sk-…").await?;
//! client.send("Hello!").await?;
//! println!("{:?}", client.transcript().last());
//! # Ok(())
//! # }
//! ```
use std::sync::Arc;

use chatwire_core::{
    credential::Credential,
    error::{ChatError, Result},
    model::ModelFamily,
    provider::{ModelCatalogProvider, StreamingChatProvider},
    transcript::Transcript,
};

use crate::{
    resolver::CredentialResolver,
    session::{SendOutcome, Session, TranscriptObserver},
};

pub struct ChatClient<B> {
    resolver: CredentialResolver<B>,
    session: Session<B>,
}

impl<B> ChatClient<B>
where
    B: StreamingChatProvider + ModelCatalogProvider,
{
    pub fn new(backend: B) -> Self {
        let backend = Arc::new(backend);
        Self {
            resolver: CredentialResolver::new(Arc::clone(&backend)),
            session: Session::new(backend),
        }
    }

    pub fn with_family(mut self, family: ModelFamily) -> Self {
        self.resolver = self.resolver.with_family(family);
        self
    }

    pub fn with_observer(mut self, observer: impl TranscriptObserver + 'static) -> Self {
        self.session = self.session.with_observer(observer);
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.session = self.session.with_instructions(instructions);
        self
    }

    pub fn resolver(&self) -> &CredentialResolver<B> {
        &self.resolver
    }

    pub fn resolver_mut(&mut self) -> &mut CredentialResolver<B> {
        &mut self.resolver
    }

    pub fn session(&self) -> &Session<B> {
        &self.session
    }

    pub fn transcript(&self) -> Transcript {
        self.session.transcript()
    }

    /// Validate a new API key; see [`CredentialResolver::submit`].
    pub async fn submit_credential(&mut self, credential: impl Into<Credential>) -> Result<Option<String>> {
        self.resolver.submit(credential).await
    }

    pub fn select_model(&mut self, id: &str) -> Result<()> {
        self.resolver.select_model(id)
    }

    /// Send with the active credential and selected model.
    ///
    /// # Errors
    ///
    /// [`ChatError::NotReady`] before a credential has been validated or when
    /// no model is selected, otherwise as [`Session::send`].
    pub async fn send(&self, text: &str) -> Result<SendOutcome> {
        let credential = self
            .resolver
            .active()
            .ok_or(ChatError::NotReady("no validated API key"))?;
        let model = self
            .resolver
            .selected_model()
            .ok_or(ChatError::NotReady("no model selected"))?;

        self.session.send(credential, model, text).await
    }
}
