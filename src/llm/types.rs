//! Wire types for the Ollama native API.
//!
//! These mirror the request and response bodies of `POST /api/generate`
//! and `POST /api/chat`. All calls made by this adapter are
//! non-streaming, so `stream` is always serialized as `false`.

use serde::{Deserialize, Serialize};

use super::options::GenerationOptions;

// ─── Request Types ───────────────────────────────────────────────────────────

/// Message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single role-tagged message in a chat request.
///
/// `content` is always a concrete string: local runtimes mishandle
/// `null` content, so a turn without text is sent as `""`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Request body for `POST /api/generate`.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub system: String,
    pub keep_alive: String,
    pub options: GenerationOptions,
    pub stream: bool,
    /// Structured-output schema, forwarded verbatim. Only present on
    /// the structured generation path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<serde_json::Value>,
}

/// Request body for `POST /api/chat`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub keep_alive: String,
    pub options: GenerationOptions,
    pub stream: bool,
}

// ─── Response Types ──────────────────────────────────────────────────────────

/// Response body of `POST /api/generate`.
///
/// A missing or empty `response` field is a valid outcome (the model
/// produced no text), not an error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub response: String,
}

/// Response body of `POST /api/chat`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub message: ChatResponseMessage,
}

/// The assistant message inside a chat response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponseMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

// ─── Tests ───────────────────────────────────────────────────────────────────
