//! LLM adapter error types.
//!
//! All errors implement `std::error::Error` via `thiserror`. Transport
//! failures carry the context needed for meaningful log entries and
//! propagate to the caller unchanged; there is no retry policy at this
//! layer.

use thiserror::Error;

use crate::settings::SettingsError;

/// Errors that can occur while dispatching requests to the runtime.
#[derive(Debug, Error)]
pub enum LlmError {
    /// A call was issued before the client handle was initialized.
    #[error("client not ready: bootstrap has not completed")]
    NotReady,

    /// TCP/HTTP connection to the runtime endpoint failed.
    #[error("connection failed to {endpoint}: {reason}")]
    ConnectionFailed { endpoint: String, reason: String },

    /// The runtime did not respond within the configured timeout.
    #[error("inference timeout after {duration_secs}s")]
    Timeout { duration_secs: u64 },

    /// Non-2xx HTTP response from the runtime.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// Structured-generation output failed to parse against the schema
    /// encoding. The caller decides whether to retry with an adjusted
    /// prompt.
    #[error("structured response parse error: {reason}")]
    ParseError { reason: String },

    /// Settings store failure while resolving call parameters.
    #[error("settings error: {reason}")]
    SettingsError { reason: String },
}

impl From<SettingsError> for LlmError {
    fn from(e: SettingsError) -> Self {
        LlmError::SettingsError {
            reason: e.to_string(),
        }
    }
}
