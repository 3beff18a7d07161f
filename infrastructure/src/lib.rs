//! Infrastructure layer for zia
//!
//! This crate contains the adapters behind the application ports: the
//! in-process tool registry and executor, the external tool-provider
//! processes, the model backends, and configuration file loading.

pub mod config;
pub mod process;
pub mod providers;
pub mod tools;

// Re-export commonly used types
pub use config::{
    ConfigError, ConfigIssue, ConfigLoader, ConfigSource, FileAgentConfig, FileConfig,
    FileModelConfig, FileProxyConfig, FileServersConfig, ModelBackend, ProcessConfig, ServersFile,
    Severity,
};
pub use process::{
    BridgedTool, ConnectionState, ProcessConnection, ProcessError, ProcessPool, ProviderStatus,
};
pub use providers::{
    anthropic::{AnthropicConfig, AnthropicProvider},
    provider_from_config,
    proxy::{ProxyProvider, ProxyTokens},
};
pub use tools::{RegistryToolExecutor, ToolRegistry};
