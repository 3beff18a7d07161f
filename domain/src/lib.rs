//! Domain layer for zia
//!
//! This crate contains the core types of the tool-orchestration runtime.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! - **Tool**: a named, schema-described capability the model may invoke,
//!   backed by local code or by an external provider process
//! - **Conversation**: ordered messages of structured content blocks,
//!   including tool calls and their results
//! - **ModelResponse**: the normalized output every model backend produces

pub mod core;
pub mod session;
pub mod tool;
pub mod util;

// Re-export commonly used types
pub use core::error::DomainError;
pub use session::{
    entities::{Conversation, Message, Role},
    response::{ContentBlock, ModelResponse, StopReason, Usage},
};
pub use tool::{
    entities::{ParameterSchema, PropertySchema, ToolDefinition, ToolUse},
    input::ToolInput,
    traits::{DefaultToolValidator, Tool, ToolValidator},
    value_objects::{ToolError, ToolResult},
};
