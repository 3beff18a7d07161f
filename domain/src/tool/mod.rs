//! Tool domain module
//!
//! This module defines the core abstractions of the **Tool System**: how the
//! model reaches capabilities on the host, whether they are implemented in
//! process or bridged from an external provider process.
//!
//! ```text
//! ┌────────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ ToolDefinition │───▶│ ToolUse      │───▶│ ToolResult   │
//! │ (schema)       │    │ (invocation) │    │ (output)     │
//! └────────────────┘    └──────────────┘    └──────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`Tool`]: capability contract (`definition` + async `execute`)
//! - [`ToolDefinition`]: name, description and [`ParameterSchema`]
//! - [`ToolUse`]: an invocation request with a [`ToolInput`]
//! - [`ToolResult`]: success-or-error outcome, never an exception
//! - [`ToolValidator`]: pure parameter validation against a definition
//!
//! # Architecture
//!
//! - **Domain** (this module): pure definitions, no I/O
//! - **Application** (`ToolExecutorPort`): port trait for tool execution
//! - **Infrastructure** (`ToolRegistry`, `RegistryToolExecutor`, bridged
//!   process tools): concrete lookup and execution

pub mod entities;
pub mod input;
pub mod traits;
pub mod value_objects;

pub use entities::{ParameterSchema, PropertySchema, ToolDefinition, ToolUse};
pub use input::ToolInput;
pub use traits::{DefaultToolValidator, Tool, ToolValidator};
pub use value_objects::{ToolError, ToolResult};
