//! Wire client for the Ollama native API.
//!
//! Thin HTTP layer: builds the reqwest client, posts request bodies,
//! maps transport failures to typed errors. No retry policy and no
//! request shaping here; the dispatcher owns both.

use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::errors::LlmError;
use super::types::{ChatRequest, ChatResponse, GenerateRequest, GenerateResponse};

// ─── Constants ───────────────────────────────────────────────────────────────

/// TCP connection timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Total request timeout.
///
/// Calls are non-streaming: the runtime answers only once the full
/// completion is generated, and a large context window can hold the
/// response for minutes. A short timeout here surfaces as a spurious
/// "empty response" to the chat layer.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(180);

// ─── OllamaClient ────────────────────────────────────────────────────────────

/// Client handle for one Ollama endpoint.
///
/// Stateless and reentrant: any number of concurrent requests may be
/// issued through one handle. Endpoint changes are handled by building
/// a replacement handle, never by mutating this one.
pub struct OllamaClient {
    http: HttpClient,
    base_url: String,
}

impl OllamaClient {
    /// Create a client for the given endpoint address.
    ///
    /// Does NOT check connectivity; that happens on the first request.
    pub fn new(base_url: &str) -> Result<Self, LlmError> {
        let http = HttpClient::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| LlmError::ConnectionFailed {
                endpoint: base_url.to_string(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The endpoint address this handle talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Single-shot completion via `POST /api/generate`.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, LlmError> {
        tracing::info!(
            model = %request.model,
            prompt_len = request.prompt.len(),
            has_system = !request.system.is_empty(),
            structured = request.format.is_some(),
            "ollama generate request"
        );
        self.post_json("/api/generate", request).await
    }

    /// Chat completion via `POST /api/chat`.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        tracing::info!(
            model = %request.model,
            message_count = request.messages.len(),
            "ollama chat request"
        );
        self.post_json("/api/chat", request).await
    }

    /// Check whether the endpoint is reachable.
    ///
    /// Probes the model tags listing; does not consume inference time.
    pub async fn health_check(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        match self.http.get(&url).timeout(CONNECT_TIMEOUT).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    /// POST a JSON body and decode the JSON response.
    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, LlmError>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);

        let response = self.http.post(&url).json(body).send().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout {
                    duration_secs: REQUEST_TIMEOUT.as_secs(),
                }
            } else {
                LlmError::ConnectionFailed {
                    endpoint: url.clone(),
                    reason: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(LlmError::HttpError {
                status: status.as_u16(),
                body: body_text,
            });
        }

        response.json::<R>().await.map_err(|e| LlmError::ConnectionFailed {
            endpoint: url,
            reason: format!("failed to decode response body: {e}"),
        })
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_trailing_slash() {
        let client = OllamaClient::new("http://localhost:11434/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:11434");
    }

    #[test]
    fn test_new_keeps_plain_url() {
        let client = OllamaClient::new("http://ollama.internal:11434").unwrap();
        assert_eq!(client.base_url(), "http://ollama.internal:11434");
    }

    #[tokio::test]
    async fn test_generate_against_unreachable_endpoint_is_connection_failed() {
        // Reserved TEST-NET address: connect fails fast, nothing listens.
        let client = OllamaClient::new("http://192.0.2.1:1").unwrap();
        let request = GenerateRequest {
            model: "llama3.2".into(),
            prompt: "hi".into(),
            system: String::new(),
            keep_alive: "5m".into(),
            options: Default::default(),
            stream: false,
            format: None,
        };
        let err = client.generate(&request).await.unwrap_err();
        assert!(
            matches!(err, LlmError::ConnectionFailed { .. } | LlmError::Timeout { .. }),
            "unexpected error: {err}"
        );
    }
}
