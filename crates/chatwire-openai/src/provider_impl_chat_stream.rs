use std::{future::Future, pin::Pin, sync::Arc};

use chatwire_core::{
    credential::Credential,
    error::{ChatError, Result},
    provider::{ChatRequest, DeltaStream, StreamingChatProvider},
};
use futures_util::StreamExt;

use crate::OpenAiAdapter;

impl StreamingChatProvider for OpenAiAdapter {
    fn open_chat_stream<'s>(
        &'s self,
        credential: &'s Credential,
        request: ChatRequest,
    ) -> Pin<Box<dyn Future<Output = Result<DeltaStream<'s>>> + Send + 's>> {
        let client = Arc::clone(&self.client);

        Box::pin(async move {
            let stream = client
                .chat_completion_stream(credential, request.into())
                .await?;

            let deltas: DeltaStream<'s> =
                Box::pin(stream.map(|item| item.map_err(ChatError::from)));
            Ok(deltas)
        })
    }
}
