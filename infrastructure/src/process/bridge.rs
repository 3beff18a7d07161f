//! Remote tools exposed through the [`Tool`] contract.

use std::sync::Arc;

use async_trait::async_trait;
use zia_domain::{Tool, ToolDefinition, ToolError, ToolInput};

use super::connection::ProcessConnection;
use super::error::ProcessError;
use super::protocol::RemoteTool;
use crate::tools::schema_from_json;

/// A tool discovered on a provider process.
///
/// Execution is delegated to the owning connection; a connection that has
/// dropped since discovery makes the tool unavailable rather than failing
/// the turn.
pub struct BridgedTool {
    definition: ToolDefinition,
    connection: Arc<ProcessConnection>,
}

impl BridgedTool {
    pub fn new(remote: &RemoteTool, connection: Arc<ProcessConnection>) -> Self {
        let description = remote
            .description
            .clone()
            .unwrap_or_else(|| format!("Tool '{}' from {}", remote.name, connection.name()));
        let definition = ToolDefinition::new(&remote.name, description).with_schema(
            remote
                .input_schema
                .as_ref()
                .map(schema_from_json)
                .unwrap_or_default(),
        );
        Self {
            definition,
            connection,
        }
    }

    /// Name of the provider process this tool lives on
    pub fn provider(&self) -> &str {
        self.connection.name()
    }
}

#[async_trait]
impl Tool for BridgedTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, input: &ToolInput) -> Result<String, ToolError> {
        if !self.connection.is_connected() {
            return Err(ToolError::unavailable(format!(
                "provider '{}' is not available ({})",
                self.connection.name(),
                self.connection.state()
            )));
        }

        match self
            .connection
            .call_tool(&self.definition.name, input.clone().into_value())
            .await
        {
            Ok(output) if output.is_error => Err(ToolError::execution_failed(output.content)),
            Ok(output) => Ok(output.content),
            Err(ProcessError::Timeout { after, .. }) => Err(ToolError::timeout(format!(
                "{} after {}s",
                self.definition.name,
                after.as_secs_f64()
            ))),
            Err(e) if e.is_disconnect() => Err(ToolError::unavailable(format!(
                "provider '{}': {}",
                self.connection.name(),
                e
            ))),
            Err(e) => Err(ToolError::execution_failed(e.to_string())),
        }
    }
}
