//! Provider process configuration file.
//!
//! ```toml
//! [servers.calendar]
//! command = "calendar-tools"
//! args = ["--stdio"]
//! env = { CALENDAR_TOKEN = "..." }
//! ```
//!
//! A missing file is not an error: the feature is simply inactive.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use super::file_config::{ConfigIssue, Severity};

/// Errors reading the provider process file
#[derive(Error, Debug)]
pub enum ServersFileError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Launch configuration of one tool-provider process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessConfig {
    /// Executable name or path
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Overrides applied on top of the parent environment
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl ProcessConfig {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}

/// Contents of the provider process file: name → config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServersFile {
    #[serde(default)]
    pub servers: BTreeMap<String, ProcessConfig>,
}

impl ServersFile {
    /// Load the file; a missing file yields an empty set.
    pub fn load(path: &Path) -> Result<Self, ServersFileError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No provider process file");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ServersFileError::Read {
                    path: path.display().to_string(),
                    source,
                });
            }
        };
        Self::parse(&text).map_err(|source| ServersFileError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    /// Entries that cannot be launched.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        self.servers
            .iter()
            .filter(|(_, config)| config.command.trim().is_empty())
            .map(|(name, _)| {
                ConfigIssue::new(
                    Severity::Error,
                    format!("servers.{}.command", name),
                    "command cannot be blank",
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_servers() {
        let file = ServersFile::parse(
            r#"
[servers.music]
command = "music-tools"
args = ["--stdio", "-v"]
env = { MUSIC_HOME = "/srv/music" }

[servers.minimal]
command = "minimal-server"
"#,
        )
        .unwrap();

        assert_eq!(file.servers.len(), 2);
        let music = &file.servers["music"];
        assert_eq!(music.args, vec!["--stdio", "-v"]);
        assert_eq!(music.env["MUSIC_HOME"], "/srv/music");
        assert!(file.servers["minimal"].args.is_empty());
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let file = ServersFile::load(&dir.path().join("servers.toml")).unwrap();
        assert!(file.is_empty());
    }

    #[test]
    fn test_load_from_disk() {
        let mut tmp = NamedTempFile::new().unwrap();
        writeln!(tmp, "[servers.echo]\ncommand = \"echo-server\"").unwrap();
        let file = ServersFile::load(tmp.path()).unwrap();
        assert_eq!(file.servers["echo"], ProcessConfig::new("echo-server"));
    }

    #[test]
    fn test_blank_command_is_flagged() {
        let file = ServersFile::parse("[servers.empty]\ncommand = \"  \"\n").unwrap();
        let issues = file.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "servers.empty.command");
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let mut tmp = NamedTempFile::new().unwrap();
        writeln!(tmp, "[servers.broken]\nargs = 3").unwrap();
        let err = ServersFile::load(tmp.path()).unwrap_err();
        assert!(matches!(err, ServersFileError::Parse { .. }));
    }
}
