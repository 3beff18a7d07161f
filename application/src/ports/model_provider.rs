//! Model Provider port
//!
//! Defines the interface for communicating with conversational model
//! backends. Each backend translates the normalized [`Message`] and
//! [`ContentBlock`](zia_domain::ContentBlock) shapes into its own wire
//! format and back.

use async_trait::async_trait;
use thiserror::Error;
use zia_domain::{Message, ModelResponse, ToolDefinition};

/// Errors that can occur during a model provider call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl ProviderError {
    /// Whether the caller may retry the same request later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderError::ServiceUnavailable(_) | ProviderError::Transport(_)
        )
    }
}

/// Gateway to a conversational model backend
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Short backend name used in logs (e.g. "anthropic")
    fn name(&self) -> &str;

    /// Send the full history and return the normalized response.
    ///
    /// `tools` is `None` when no tools should be offered; callers never pass
    /// an empty slice.
    async fn send(
        &self,
        messages: &[Message],
        system: Option<&str>,
        tools: Option<&[ToolDefinition]>,
    ) -> Result<ModelResponse, ProviderError>;
}
