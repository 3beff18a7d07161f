//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Every section has defaults, so a partial file (or none at all) is valid.

mod agent;
mod model;
mod proxy;
mod servers;

pub use agent::FileAgentConfig;
pub use model::{
    API_KEY_ENV, DEFAULT_API_URL, DEFAULT_API_VERSION, DEFAULT_MAX_TOKENS, DEFAULT_MODEL,
    DEFAULT_TIMEOUT_SECS, FileModelConfig, ModelBackend,
};
pub use proxy::FileProxyConfig;
pub use servers::FileServersConfig;

use serde::{Deserialize, Serialize};

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The configuration cannot work as written.
    Error,
    /// Works, possibly not as intended.
    Warning,
}

/// A detected issue in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub severity: Severity,
    /// Dotted path of the offending key, e.g. `agent.max_steps`
    pub field: String,
    pub message: String,
}

impl ConfigIssue {
    pub fn new(severity: Severity, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}: {}", level, self.field, self.message)
    }
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Model backend selection and credentials
    pub model: FileModelConfig,
    /// Credential proxy endpoint
    pub proxy: FileProxyConfig,
    /// Agent loop bounds
    pub agent: FileAgentConfig,
    /// Provider process settings
    pub servers: FileServersConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Nothing here fails hard; callers decide whether errors are fatal.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        issues.extend(self.model.validate());
        issues.extend(self.agent.validate());
        issues.extend(self.servers.validate());

        if self.model.backend == ModelBackend::Proxy {
            if !self.proxy.is_configured() {
                issues.push(ConfigIssue::new(
                    Severity::Error,
                    "proxy.base_url",
                    "backend = \"proxy\" requires [proxy] base_url",
                ));
            }
            if self.proxy.access_token.is_none() {
                issues.push(ConfigIssue::new(
                    Severity::Warning,
                    "proxy.access_token",
                    "no access token configured, requests will be rejected until one is set",
                ));
            }
        }

        issues
    }
}
