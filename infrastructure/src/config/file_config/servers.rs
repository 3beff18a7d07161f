//! Provider process settings from TOML (`[servers]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::{ConfigIssue, Severity};

/// Raw provider process settings from TOML
///
/// # Example
///
/// ```toml
/// [servers]
/// config_path = "~/.config/zia/servers.toml"
/// request_timeout_secs = 60     # omit for no per-call timeout
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileServersConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl FileServersConfig {
    /// The provider file, defaulting to `$XDG_CONFIG_HOME/zia/servers.toml`.
    pub fn resolved_config_path(&self) -> Option<PathBuf> {
        match &self.config_path {
            Some(path) => Some(expand_home(path)),
            None => dirs::config_dir().map(|d| d.join("zia").join("servers.toml")),
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub(super) fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.request_timeout_secs == Some(0) {
            issues.push(ConfigIssue::new(
                Severity::Warning,
                "servers.request_timeout_secs",
                "request_timeout_secs is 0, requests will not time out",
            ));
        }
        issues
    }
}

fn expand_home(path: &std::path::Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_path_is_used() {
        let config = FileServersConfig {
            config_path: Some(PathBuf::from("/etc/zia/servers.toml")),
            request_timeout_secs: None,
        };
        assert_eq!(
            config.resolved_config_path(),
            Some(PathBuf::from("/etc/zia/servers.toml"))
        );
        assert!(config.request_timeout().is_none());
    }

    #[test]
    fn test_zero_timeout_means_none() {
        let config = FileServersConfig {
            config_path: None,
            request_timeout_secs: Some(0),
        };
        assert!(config.request_timeout().is_none());
        assert_eq!(config.validate().len(), 1);
    }
}
