//! Credential-proxy configuration from TOML (`[proxy]` section)

use serde::{Deserialize, Serialize};

/// Raw proxy backend configuration from TOML
///
/// # Example
///
/// ```toml
/// [proxy]
/// base_url = "https://zia.example.com"
/// access_token = "..."
/// refresh_token = "..."
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProxyConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl FileProxyConfig {
    pub fn is_configured(&self) -> bool {
        self.base_url.as_deref().is_some_and(|u| !u.trim().is_empty())
    }
}
