use std::pin::Pin;

use chatwire_core::credential::Credential;
use futures_core::Stream;
use reqwest::{
    Client as HttpClient,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue},
};

use crate::{
    api_v1::{ChatCompletionRequest, ModelList},
    error::OpenAiError,
    sse,
};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Decoded text deltas of one streamed completion.
pub type OpenAiDeltaStream = Pin<Box<dyn Stream<Item = Result<String, OpenAiError>> + Send>>;

/// Minimal HTTP client for the *chat/completions* and *models* endpoints.
///
/// * Streaming completions only; the body is decoded by [`sse::deltas`].
/// * The credential is passed per call: the same client validates draft keys
///   and serves the active one.
/// * Shares a single `reqwest::Client`, so cloning `OpenAiClient` is cheap.
#[derive(Clone, Debug)]
pub struct OpenAiClient {
    http: HttpClient,
    base: String,
}

impl OpenAiClient {
    /// Build with a custom `reqwest::Client` in case the caller needs proxy
    /// settings, custom TLS, etc.
    pub fn with_http(http: HttpClient, base_url: Option<String>) -> Self {
        let base = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        Self {
            http,
            base: base.trim_end_matches('/').to_owned(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn headers(credential: &Credential) -> Result<HeaderMap, OpenAiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", credential.expose()))
            .map_err(|_| OpenAiError::Format("credential is not a valid header value".into()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        Ok(headers)
    }

    /// Start a **streaming** chat completion.
    ///
    /// Resolves once the status line is in. A non-success status is returned
    /// as [`OpenAiError::Api`] with the (non-streamed) error body; otherwise
    /// the body is handed back as a stream of text deltas.
    pub async fn chat_completion_stream(
        &self,
        credential: &Credential,
        request: ChatCompletionRequest,
    ) -> Result<OpenAiDeltaStream, OpenAiError> {
        let request = request.stream(true);

        let mut headers = Self::headers(credential)?;
        headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));

        let url = format!("{}/chat/completions", self.base);
        let resp = self
            .http
            .post(url)
            .headers(headers)
            .json(&request)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(%status, "chat completion rejected");
            return Err(OpenAiError::Api { status, body });
        }

        Ok(Box::pin(sse::deltas(resp.bytes_stream())))
    }

    /// List every model id visible to `credential`.
    pub async fn list_models(&self, credential: &Credential) -> Result<Vec<String>, OpenAiError> {
        let url = format!("{}/models", self.base);
        let resp = self
            .http
            .get(url)
            .headers(Self::headers(credential)?)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(OpenAiError::Api { status, body });
        }

        let bytes = resp.bytes().await?;
        let parsed: ModelList = serde_json::from_slice(&bytes)?;
        Ok(parsed.into_ids())
    }
}
