//! LLM adapter: request shaping and dispatch for a local Ollama
//! runtime.
//!
//! Submodules:
//! - `options`: typed sampling parameters, decode + merge
//! - `messages`: conversation history to role-tagged message list
//! - `client`: reqwest wire client for `/api/generate` and `/api/chat`
//! - `helper`: the settings-backed request dispatcher
//! - `types`: wire request/response bodies
//! - `errors`: adapter-level error types
//!
//! All calls are non-streaming: a call suspends until the runtime has
//! produced the full response. The model is interchangeable via the
//! settings store; switching deployments is a settings change, not a
//! code change.

pub mod client;
pub mod errors;
pub mod helper;
pub mod messages;
pub mod options;
pub mod types;

// Re-exports for convenience
pub use client::OllamaClient;
pub use errors::LlmError;
pub use helper::LlmHelper;
pub use messages::{format_history, ConversationTurn, Originator};
pub use options::{CallOptions, GenerationOptions};
pub use types::{ChatMessage, ChatResponse, GenerateResponse, Role};
