//! Model backend configuration from TOML (`[model]` section)

use serde::{Deserialize, Serialize};

use super::{ConfigIssue, Severity};

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
pub const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_API_VERSION: &str = "2023-06-01";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Environment variable consulted when `api_key` is not set.
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Which backend answers model requests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelBackend {
    /// Direct Anthropic Messages API
    #[default]
    Anthropic,
    /// App backend holding the credential on our behalf
    Proxy,
}

impl std::fmt::Display for ModelBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelBackend::Anthropic => write!(f, "anthropic"),
            ModelBackend::Proxy => write!(f, "proxy"),
        }
    }
}

/// Raw model configuration from TOML
///
/// # Example
///
/// ```toml
/// [model]
/// backend = "anthropic"        # "anthropic" or "proxy"
/// model = "claude-sonnet-4-20250514"
/// max_tokens = 4096
/// timeout_secs = 120
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelConfig {
    pub backend: ModelBackend,
    pub model: String,
    pub max_tokens: u32,
    pub api_url: String,
    pub api_version: String,
    /// Falls back to `ANTHROPIC_API_KEY`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for FileModelConfig {
    fn default() -> Self {
        Self {
            backend: ModelBackend::default(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            api_url: DEFAULT_API_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl FileModelConfig {
    /// The configured key, or the environment fallback. Blank keys count as unset.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty())
    }

    pub(super) fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.model.trim().is_empty() {
            issues.push(ConfigIssue::new(
                Severity::Error,
                "model.model",
                "model name cannot be empty",
            ));
        }
        if self.max_tokens == 0 {
            issues.push(ConfigIssue::new(
                Severity::Error,
                "model.max_tokens",
                "max_tokens must be greater than 0",
            ));
        }
        if self.timeout_secs == 0 {
            issues.push(ConfigIssue::new(
                Severity::Warning,
                "model.timeout_secs",
                format!("timeout_secs is 0, using {}", DEFAULT_TIMEOUT_SECS),
            ));
        }
        issues
    }
}
