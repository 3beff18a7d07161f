//! Error types for provider process connections

use std::time::Duration;
use thiserror::Error;

/// Result type alias for provider process operations
pub type Result<T> = std::result::Result<T, ProcessError>;

/// Errors that can occur when talking to a tool-provider process
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("No provider configured with name '{0}'")]
    NotConfigured(String),

    #[error("Failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command not found on PATH: {command}")]
    CommandNotFound { command: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("JSON-RPC error (code {code}): {message}")]
    Rpc { code: i64, message: String },

    #[error("server disconnected")]
    Disconnected,

    #[error("Not connected (state: {state})")]
    NotConnected { state: String },

    #[error("Request '{method}' timed out after {}s", .after.as_secs_f64())]
    Timeout { method: String, after: Duration },

    #[error("Handshake failed during {stage}: {reason}")]
    Handshake { stage: &'static str, reason: String },

    #[error("Invalid provider configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl ProcessError {
    /// The child went away or was never reachable.
    pub fn is_disconnect(&self) -> bool {
        matches!(
            self,
            ProcessError::Disconnected | ProcessError::NotConnected { .. }
        )
    }
}
