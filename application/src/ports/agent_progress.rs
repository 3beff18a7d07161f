//! Agent execution progress port.
//!
//! [`AgentProgressNotifier`] is an **output port** the caller implements to
//! display what the agent loop is doing. All methods have default no-op
//! implementations, so implementers only override the callbacks they care
//! about.
//!
//! ```ignore
//! struct StderrProgress;
//!
//! impl AgentProgressNotifier for StderrProgress {
//!     fn on_tool_call(&self, call: &ToolUse) {
//!         eprintln!("→ {}", call.name);
//!     }
//! }
//! ```

use zia_domain::{ModelResponse, ToolResult, ToolUse};

use crate::use_cases::run_agent::TurnOutcome;

/// Progress notifier for agent execution.
pub trait AgentProgressNotifier: Send + Sync {
    /// Called at the top of each loop iteration (0-based)
    fn on_step_start(&self, _step: usize) {}

    /// Called when the model provider returns
    fn on_model_response(&self, _response: &ModelResponse) {}

    /// Called before a tool is invoked
    fn on_tool_call(&self, _call: &ToolUse) {}

    /// Called when a tool returns (success or error result)
    fn on_tool_result(&self, _call: &ToolUse, _result: &ToolResult) {}

    /// Called once when the turn ends normally or at a bound
    fn on_turn_end(&self, _outcome: &TurnOutcome) {}
}

/// No-op progress notifier
pub struct NoAgentProgress;

impl AgentProgressNotifier for NoAgentProgress {}
