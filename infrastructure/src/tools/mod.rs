//! Tool registry and execution
//!
//! - [`ToolRegistry`]: name → [`Tool`](zia_domain::Tool) mapping shared by
//!   local and bridged tools
//! - [`RegistryToolExecutor`]: the [`ToolExecutorPort`](zia_application::ToolExecutorPort)
//!   adapter the agent loop runs tool calls through
//! - [`schema`]: lenient JSON Schema translation

pub mod schema;

mod executor;
mod registry;

pub use executor::RegistryToolExecutor;
pub use registry::ToolRegistry;
pub use schema::{schema_from_json, tool_to_api_schema};
