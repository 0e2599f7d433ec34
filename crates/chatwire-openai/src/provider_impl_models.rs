use std::{future::Future, pin::Pin, sync::Arc};

use chatwire_core::{credential::Credential, error::Result, provider::ModelCatalogProvider};

use crate::OpenAiAdapter;

impl ModelCatalogProvider for OpenAiAdapter {
    fn list_models<'s>(
        &'s self,
        credential: &'s Credential,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<String>>> + Send + 's>> {
        let client = Arc::clone(&self.client);

        Box::pin(async move { Ok(client.list_models(credential).await?) })
    }
}
