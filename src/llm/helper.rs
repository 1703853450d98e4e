//! Request dispatcher: settings-backed entry point for all runtime
//! calls.
//!
//! [`LlmHelper`] owns the long-lived client handle, re-creates it when
//! the endpoint-address setting changes, and exposes the four call
//! shapes: single-shot completion, structured completion, multi-turn
//! chat, and raw chat completion. Each call reads the settings store
//! fresh, merges per-call overrides over the stored defaults, and
//! sends one non-streaming request.

use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};

use crate::settings::{catalog, keys, SettingsSnapshot, SettingsStore, HELPER_NAMESPACE};

use super::client::OllamaClient;
use super::errors::LlmError;
use super::messages::{format_history, ConversationTurn};
use super::options::{CallOptions, GenerationOptions};
use super::types::{ChatMessage, ChatRequest, ChatResponse, GenerateRequest, Role};

// ─── LlmHelper ───────────────────────────────────────────────────────────────

/// Settings-backed dispatcher for a local Ollama runtime.
///
/// The handle cell starts empty; calls fail with [`LlmError::NotReady`]
/// until [`bootstrap`](Self::bootstrap) installs the first handle.
/// After that the handle is only ever replaced whole, so concurrent
/// callers observe either the old or the new client, never a partially
/// constructed one. In-flight requests keep their own `Arc` and finish
/// against whichever handle they started with.
pub struct LlmHelper {
    settings: Arc<SettingsStore>,
    client: RwLock<Option<Arc<OllamaClient>>>,
}

impl LlmHelper {
    /// Create an uninitialized helper around a settings store.
    pub fn new(settings: Arc<SettingsStore>) -> Self {
        Self {
            settings,
            client: RwLock::new(None),
        }
    }

    /// Build the first client handle from the stored endpoint address.
    pub async fn bootstrap(&self) -> Result<(), LlmError> {
        let snapshot = self.settings.get_settings(HELPER_NAMESPACE)?;
        let api_url = text_or_default(&snapshot, keys::API_URL);
        self.replace_endpoint(&api_url).await
    }

    /// Replace the client handle with one for a new endpoint address.
    ///
    /// Safe to call while requests are in flight: those hold their own
    /// reference to the old handle and complete independently.
    pub async fn replace_endpoint(&self, api_url: &str) -> Result<(), LlmError> {
        let client = OllamaClient::new(api_url)?;
        let mut cell = self.client.write().await;
        let previous = cell.replace(Arc::new(client));
        tracing::info!(
            endpoint = %api_url,
            replaced = previous.is_some(),
            "ollama client handle installed"
        );
        Ok(())
    }

    /// The endpoint address of the current handle, if initialized.
    pub async fn current_endpoint(&self) -> Option<String> {
        let cell = self.client.read().await;
        cell.as_ref().map(|c| c.base_url().to_string())
    }

    /// Listen for endpoint-address setting changes and swap the handle.
    ///
    /// Subscribes to the store's change channel and reacts only to the
    /// `api_url` key of the helper namespace. A handle that fails to
    /// build leaves the last good one in place.
    pub fn spawn_endpoint_watcher(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        let helper = self;
        let mut rx = helper.settings.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(change)
                        if change.namespace == HELPER_NAMESPACE
                            && change.name == keys::API_URL =>
                    {
                        let Some(url) = change.value.as_text().map(String::from) else {
                            tracing::warn!("api_url changed to a non-text value, ignoring");
                            continue;
                        };
                        if let Err(e) = helper.replace_endpoint(&url).await {
                            tracing::warn!(
                                endpoint = %url,
                                error = %e,
                                "failed to rebuild client for new endpoint, keeping old handle"
                            );
                        }
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        // Only the latest endpoint matters; skipped
                        // intermediate values are harmless.
                        tracing::warn!(missed, "settings change listener lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// The current client handle, or `NotReady` before bootstrap.
    async fn client(&self) -> Result<Arc<OllamaClient>, LlmError> {
        let cell = self.client.read().await;
        cell.as_ref().cloned().ok_or(LlmError::NotReady)
    }

    // ─── Call shapes ─────────────────────────────────────────────────────

    /// Generate a single completion for `prompt`.
    ///
    /// Model and keep-alive resolve from the call first (empty counts
    /// as unset), then from the stored settings. Returns the runtime's
    /// text output; an empty response is returned as `""`, not an
    /// error.
    pub async fn generate_response(
        &self,
        prompt: &str,
        model: Option<&str>,
        system: Option<&str>,
        call: CallOptions,
    ) -> Result<String, LlmError> {
        let client = self.client().await?;
        let request = self.build_generate_request(prompt, model, system, &call, None)?;
        let response = client.generate(&request).await?;
        Ok(response.response)
    }

    /// Generate a completion constrained by `schema` and parse it.
    ///
    /// The schema is forwarded verbatim to the runtime. Sampling is
    /// pinned deterministic: temperature is forced to zero after the
    /// merge, regardless of stored settings or caller overrides.
    pub async fn generate_structured_response<T>(
        &self,
        prompt: &str,
        model: Option<&str>,
        system: Option<&str>,
        schema: &serde_json::Value,
        call: CallOptions,
    ) -> Result<T, LlmError>
    where
        T: serde::de::DeserializeOwned,
    {
        let client = self.client().await?;
        let request =
            self.build_generate_request(prompt, model, system, &call, Some(schema.clone()))?;
        let response = client.generate(&request).await?;
        serde_json::from_str(&response.response).map_err(|e| LlmError::ParseError {
            reason: e.to_string(),
        })
    }

    /// Send a chat completion with conversation history.
    ///
    /// The message list is one system message, the formatted history
    /// (oldest first), then a final user message carrying `prompt`.
    /// Returns the reply content, `""` when the runtime sends none.
    pub async fn generate_chat_completion(
        &self,
        prompt: &str,
        model: &str,
        system_prompt: &str,
        history: &[ConversationTurn],
        call: CallOptions,
    ) -> Result<String, LlmError> {
        let client = self.client().await?;
        let request = self.build_chat_request(prompt, model, system_prompt, history, &call)?;
        let response = client.chat(&request).await?;
        Ok(response.message.content)
    }

    /// Raw chat completion: the caller supplies the full message list,
    /// the helper supplies merged options, resolved model, and
    /// keep-alive, and returns the runtime's response object.
    pub async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
        model: Option<&str>,
        call: CallOptions,
    ) -> Result<ChatResponse, LlmError> {
        let client = self.client().await?;
        let resolved = self.resolve_call(model, &call)?;
        let request = ChatRequest {
            model: resolved.model,
            messages,
            keep_alive: resolved.keep_alive,
            options: resolved.options,
            stream: false,
        };
        client.chat(&request).await
    }

    // ─── Request building ────────────────────────────────────────────────

    fn build_generate_request(
        &self,
        prompt: &str,
        model: Option<&str>,
        system: Option<&str>,
        call: &CallOptions,
        format: Option<serde_json::Value>,
    ) -> Result<GenerateRequest, LlmError> {
        let resolved = self.resolve_call(model, call)?;
        let mut options = resolved.options;
        if format.is_some() {
            // Structured output must be reproducible.
            options.temperature = Some(0.0);
        }
        Ok(GenerateRequest {
            model: resolved.model,
            prompt: prompt.to_string(),
            system: system.unwrap_or_default().to_string(),
            keep_alive: resolved.keep_alive,
            options,
            stream: false,
            format,
        })
    }

    fn build_chat_request(
        &self,
        prompt: &str,
        model: &str,
        system_prompt: &str,
        history: &[ConversationTurn],
        call: &CallOptions,
    ) -> Result<ChatRequest, LlmError> {
        let resolved = self.resolve_call(Some(model), call)?;

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::new(Role::System, system_prompt));
        messages.extend(format_history(history));
        messages.push(ChatMessage::new(Role::User, prompt));

        Ok(ChatRequest {
            model: resolved.model,
            messages,
            keep_alive: resolved.keep_alive,
            options: resolved.options,
            stream: false,
        })
    }

    /// Resolve model, keep-alive, and merged options for one call.
    ///
    /// Reads the settings store fresh so hot updates apply to the next
    /// call. The connection keys never enter the options object; the
    /// decode step only reads sampling keys.
    fn resolve_call(
        &self,
        model: Option<&str>,
        call: &CallOptions,
    ) -> Result<ResolvedCall, LlmError> {
        let snapshot = self.settings.get_settings(HELPER_NAMESPACE)?;

        let model = model
            .filter(|m| !m.is_empty())
            .map(String::from)
            .unwrap_or_else(|| text_or_default(&snapshot, keys::MODEL));

        let keep_alive = call
            .keep_alive
            .as_deref()
            .filter(|k| !k.is_empty())
            .map(String::from)
            .unwrap_or_else(|| text_or_default(&snapshot, keys::KEEP_ALIVE));

        let defaults = GenerationOptions::from_snapshot(&snapshot);
        let options = call.options.merged_over(&defaults);

        Ok(ResolvedCall {
            model,
            keep_alive,
            options,
        })
    }
}

/// Final parameters for one runtime call.
struct ResolvedCall {
    model: String,
    keep_alive: String,
    options: GenerationOptions,
}

/// Text setting with catalog-default fallback for missing rows.
fn text_or_default(snapshot: &SettingsSnapshot, name: &str) -> String {
    match snapshot.text(name) {
        Some(value) => value.to_string(),
        None => catalog::find(name)
            .map(|spec| spec.default_text.to_string())
            .unwrap_or_default(),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
