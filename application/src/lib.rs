//! Application layer for zia
//!
//! This crate contains the agent loop use case, its port definitions and
//! loop configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::ExecutionParams;
pub use ports::{
    agent_progress::{AgentProgressNotifier, NoAgentProgress},
    model_provider::{ModelProvider, ProviderError},
    tool_executor::ToolExecutorPort,
};
pub use use_cases::run_agent::{
    ImageAttachment, RunAgentError, RunAgentInput, RunAgentOutput, RunAgentUseCase, TurnOutcome,
};
