use std::{env, sync::Arc, time::Duration};

use chatwire_core::error::{ChatError, Result};
use reqwest::Client as HttpClient;

use crate::client::OpenAiClient;

pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Wires the HTTP client [`OpenAiClient`] into a value implementing
/// [`chatwire_core::provider::StreamingChatProvider`] and
/// [`chatwire_core::provider::ModelCatalogProvider`].
///
/// The adapter holds no credential; the engine passes one per request.
#[derive(Clone, Debug)]
pub struct OpenAiAdapter {
    pub(crate) client: Arc<OpenAiClient>,
}

impl OpenAiAdapter {
    pub fn client(&self) -> &OpenAiClient {
        &self.client
    }
}

/// Builder for [`OpenAiAdapter`].
///
/// ```rust,no_run
/// use chatwire_openai::OpenAiAdapterBuilder;
///
/// let backend = OpenAiAdapterBuilder::new_from_env()
///     .build()
///     .expect("http client");
/// ```
///
/// Only a connect timeout is applied. A whole-request timeout would cut off
/// long streamed answers.
#[derive(Default)]
pub struct OpenAiAdapterBuilder {
    pub(crate) base_url: Option<String>,
    pub(crate) connect_timeout: Option<Duration>,
    pub(crate) http: Option<HttpClient>,
}

impl OpenAiAdapterBuilder {
    /// Create an *empty* builder targeting the public OpenAI endpoint.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the base URL from `OPENAI_BASE_URL` (for proxies and
    /// OpenAI-compatible servers). Missing or empty means the default.
    pub fn new_from_env() -> Self {
        Self {
            base_url: env::var(BASE_URL_ENV).ok().filter(|url| !url.trim().is_empty()),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Use a preconfigured `reqwest::Client`; the connect timeout is then
    /// the caller's business.
    pub fn with_http_client(mut self, http: HttpClient) -> Self {
        self.http = Some(http);
        self
    }

    /// Finalise the builder and return a ready-to-use adapter.
    ///
    /// # Errors
    ///
    /// * [`ChatError::Transport`] – if the HTTP client cannot be constructed.
    pub fn build(self) -> Result<OpenAiAdapter> {
        let http = match self.http {
            Some(http) => http,
            None => HttpClient::builder()
                .connect_timeout(self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT))
                .build()
                .map_err(|err| ChatError::Transport(Box::new(err)))?,
        };

        Ok(OpenAiAdapter {
            client: Arc::new(OpenAiClient::with_http(http, self.base_url)),
        })
    }
}
