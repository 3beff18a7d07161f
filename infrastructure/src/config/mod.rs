//! Configuration loading for zia
//!
//! Two files are involved:
//!
//! - the main config (`config.toml`), layered with `figment`: defaults,
//!   global, project, `--config`, then `ZIA_*` environment variables
//! - the provider process file (`servers.toml`), naming the tool-provider
//!   processes to launch

mod file_config;
mod loader;
mod servers;

pub use file_config::{
    API_KEY_ENV, ConfigIssue, DEFAULT_API_URL, DEFAULT_API_VERSION, DEFAULT_MAX_TOKENS,
    DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS, FileAgentConfig, FileConfig, FileModelConfig,
    FileProxyConfig, FileServersConfig, ModelBackend, Severity,
};
pub use loader::{ConfigError, ConfigLoader, ConfigSource};
pub use servers::{ProcessConfig, ServersFile, ServersFileError};
