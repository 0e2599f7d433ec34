//! In-memory backend answering from a script, for engine tests.
use std::{
    collections::VecDeque,
    future::Future,
    pin::Pin,
    sync::Mutex,
};

use chatwire_core::{
    credential::Credential,
    error::{ChatError, Result},
    provider::{ChatRequest, DeltaStream, ModelCatalogProvider, StreamingChatProvider},
};

pub(crate) enum Script {
    Deltas(Vec<Result<String>>),
    Fail(ChatError),
}

#[derive(Default)]
pub(crate) struct ScriptedProvider {
    chat: Mutex<VecDeque<Script>>,
    catalog: Mutex<VecDeque<Result<Vec<String>>>>,
    requests: Mutex<Vec<ChatRequest>>,
    validated: Mutex<Vec<Credential>>,
}

impl ScriptedProvider {
    pub(crate) fn new(chat: impl IntoIterator<Item = Script>) -> Self {
        Self {
            chat: Mutex::new(chat.into_iter().collect()),
            ..Self::default()
        }
    }

    pub(crate) fn with_catalog(catalog: impl IntoIterator<Item = Result<Vec<String>>>) -> Self {
        Self {
            catalog: Mutex::new(catalog.into_iter().collect()),
            ..Self::default()
        }
    }

    pub(crate) fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn validated(&self) -> Vec<Credential> {
        self.validated.lock().unwrap().clone()
    }
}

impl StreamingChatProvider for ScriptedProvider {
    fn open_chat_stream<'s>(
        &'s self,
        _credential: &'s Credential,
        request: ChatRequest,
    ) -> Pin<Box<dyn Future<Output = Result<DeltaStream<'s>>> + Send + 's>> {
        Box::pin(async move {
            // let a concurrently polled send observe the in-flight state
            tokio::task::yield_now().await;

            self.requests.lock().unwrap().push(request);
            let script = self
                .chat
                .lock()
                .unwrap()
                .pop_front()
                .expect("no scripted chat response left");

            match script {
                Script::Deltas(items) => {
                    let stream: DeltaStream<'s> = Box::pin(futures_util::stream::iter(items));
                    Ok(stream)
                }
                Script::Fail(err) => Err(err),
            }
        })
    }
}

impl ModelCatalogProvider for ScriptedProvider {
    fn list_models<'s>(
        &'s self,
        credential: &'s Credential,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<String>>> + Send + 's>> {
        Box::pin(async move {
            self.validated.lock().unwrap().push(credential.clone());
            self.catalog
                .lock()
                .unwrap()
                .pop_front()
                .expect("no scripted catalog response left")
        })
    }
}
