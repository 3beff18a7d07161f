//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("Message content must not be empty")]
    EmptyMessage,

    #[error("tool_result references unknown tool_use id: {0}")]
    UnknownToolUse(String),

    #[error("Tool results must be delivered in a user message")]
    ToolResultOutsideUserMessage,
}
