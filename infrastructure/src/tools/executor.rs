//! Registry-backed tool executor, the concrete [`ToolExecutorPort`].
//!
//! # Execution Path
//!
//! ```text
//! ToolExecutorPort::execute(call)
//!   ├─ unknown name      → error result "Unknown tool: <name>"
//!   ├─ validate input    → INVALID_ARGUMENT error result
//!   └─ Tool::execute     → Ok(text)  → success result
//!                        → Err(e)    → error result
//!                        → panic     → EXECUTION_FAILED error result
//! ```
//!
//! No failure escapes as `Err` or as a panic: the agent loop always gets a
//! result it can hand back to the model.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use zia_application::ports::tool_executor::ToolExecutorPort;
use zia_domain::{
    DefaultToolValidator, ToolDefinition, ToolError, ToolResult, ToolUse, ToolValidator,
};

use super::registry::ToolRegistry;

/// Executes tool calls against a shared [`ToolRegistry`].
#[derive(Debug, Clone)]
pub struct RegistryToolExecutor {
    registry: Arc<ToolRegistry>,
    validator: DefaultToolValidator,
}

impl RegistryToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            validator: DefaultToolValidator,
        }
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[async_trait]
impl ToolExecutorPort for RegistryToolExecutor {
    fn definitions(&self) -> Vec<ToolDefinition> {
        self.registry.all_definitions()
    }

    fn has_tool(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    async fn execute(&self, call: &ToolUse) -> ToolResult {
        let Some(tool) = self.registry.tool(&call.name) else {
            tracing::warn!(tool = %call.name, id = %call.id, "Model called an unknown tool");
            return ToolResult::failure(&call.id, &ToolError::unknown_tool(&call.name));
        };

        if let Err(e) = self.validator.validate(&call.input, tool.definition()) {
            tracing::debug!(tool = %call.name, error = %e, "Rejected tool input");
            return ToolResult::failure(&call.id, &e);
        }

        tracing::debug!(tool = %call.name, id = %call.id, "Executing tool");
        let outcome = AssertUnwindSafe(tool.execute(&call.input))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(content)) => ToolResult::success(&call.id, content),
            Ok(Err(e)) => {
                tracing::debug!(tool = %call.name, error = %e, "Tool returned an error");
                ToolResult::failure(&call.id, &e)
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::warn!(tool = %call.name, panic = %message, "Tool panicked");
                ToolResult::failure(
                    &call.id,
                    &ToolError::execution_failed(format!("tool '{}' panicked", call.name))
                        .with_details(message),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zia_domain::{PropertySchema, Tool, ToolInput};

    struct Echo {
        definition: ToolDefinition,
    }

    impl Echo {
        fn new() -> Self {
            Self {
                definition: ToolDefinition::new("echo", "Echo the text back")
                    .with_required_property("text", PropertySchema::string()),
            }
        }
    }

    #[async_trait]
    impl Tool for Echo {
        fn definition(&self) -> &ToolDefinition {
            &self.definition
        }

        async fn execute(&self, input: &ToolInput) -> Result<String, ToolError> {
            Ok(input.required_string("text")?.to_string())
        }
    }

    struct Failing;

    #[async_trait]
    impl Tool for Failing {
        fn definition(&self) -> &ToolDefinition {
            static DEF: std::sync::OnceLock<ToolDefinition> = std::sync::OnceLock::new();
            DEF.get_or_init(|| ToolDefinition::new("fail", "Always fails"))
        }

        async fn execute(&self, _input: &ToolInput) -> Result<String, ToolError> {
            Err(ToolError::execution_failed("disk on fire"))
        }
    }

    struct Panicking;

    #[async_trait]
    impl Tool for Panicking {
        fn definition(&self) -> &ToolDefinition {
            static DEF: std::sync::OnceLock<ToolDefinition> = std::sync::OnceLock::new();
            DEF.get_or_init(|| ToolDefinition::new("boom", "Panics"))
        }

        async fn execute(&self, _input: &ToolInput) -> Result<String, ToolError> {
            panic!("kaboom");
        }
    }

    fn executor() -> RegistryToolExecutor {
        let registry = Arc::new(ToolRegistry::new());
        registry.register_tool(Echo::new());
        registry.register_tool(Failing);
        registry.register_tool(Panicking);
        RegistryToolExecutor::new(registry)
    }

    #[tokio::test]
    async fn test_echo_success() {
        let call = ToolUse::new("t1", "echo", ToolInput::new().with("text", "hi"));
        let result = executor().execute(&call).await;
        assert_eq!(result.tool_use_id, "t1");
        assert_eq!(result.content, "hi");
        assert!(!result.is_error);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_error_result() {
        let call = ToolUse::new("t2", "nope", ToolInput::new());
        let result = executor().execute(&call).await;
        assert!(result.is_error);
        assert!(result.content.contains("Unknown tool: nope"));
    }

    #[tokio::test]
    async fn test_missing_required_parameter() {
        let call = ToolUse::new("t3", "echo", ToolInput::new());
        let result = executor().execute(&call).await;
        assert!(result.is_error);
        assert!(result.content.contains("INVALID_ARGUMENT"));
        assert!(result.content.contains("'text'"));
    }

    #[tokio::test]
    async fn test_tool_error_becomes_result() {
        let call = ToolUse::new("t4", "fail", ToolInput::new());
        let result = executor().execute(&call).await;
        assert!(result.is_error);
        assert!(result.content.contains("disk on fire"));
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let call = ToolUse::new("t5", "boom", ToolInput::new());
        let result = executor().execute(&call).await;
        assert!(result.is_error);
        assert!(result.content.contains("EXECUTION_FAILED"));
        assert!(result.content.contains("kaboom"));
    }

    #[tokio::test]
    async fn test_execute_all_keeps_order() {
        let exec = executor();
        let calls = vec![
            ToolUse::new("a", "echo", ToolInput::new().with("text", "one")),
            ToolUse::new("b", "nope", ToolInput::new()),
            ToolUse::new("c", "echo", ToolInput::new().with("text", "three")),
        ];
        let results = exec.execute_all(&calls).await;
        let ids: Vec<_> = results.iter().map(|r| r.tool_use_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(results[1].is_error);
        assert_eq!(results[2].content, "three");
    }

    #[test]
    fn test_definitions_follow_registry() {
        let exec = executor();
        assert!(exec.has_tool("echo"));
        assert_eq!(exec.definitions().len(), 3);
        exec.registry().unregister("boom");
        assert_eq!(exec.definitions().len(), 2);
    }
}
