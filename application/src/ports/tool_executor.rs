//! Tool Executor port
//!
//! Defines the interface the agent loop uses to run tool calls.

use async_trait::async_trait;
use zia_domain::{ToolDefinition, ToolResult, ToolUse};

/// Port for tool execution
///
/// `execute` never fails: an unknown tool, a tool error or a panic all come
/// back as a [`ToolResult`] with `is_error = true`.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait ToolExecutorPort: Send + Sync {
    /// Definitions of every tool currently available, sorted by name
    fn definitions(&self) -> Vec<ToolDefinition>;

    /// Check if a tool is available
    fn has_tool(&self, name: &str) -> bool {
        self.definitions().iter().any(|d| d.name == name)
    }

    /// Execute a single tool call
    async fn execute(&self, call: &ToolUse) -> ToolResult;

    /// Execute calls one after another, returning results in input order
    async fn execute_all(&self, calls: &[ToolUse]) -> Vec<ToolResult> {
        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            results.push(self.execute(call).await);
        }
        results
    }
}
