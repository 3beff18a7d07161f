//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Project-level config file names, checked in order
const PROJECT_FILES: &[&str] = &["zia.toml", ".zia.toml"];

/// Prefix of environment overrides, e.g. `ZIA_MODEL__MAX_TOKENS=2048`
const ENV_PREFIX: &str = "ZIA_";

/// Errors loading the configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),
}

/// One place configuration may come from, for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    pub label: &'static str,
    pub path: PathBuf,
    pub found: bool,
}

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. Environment: `ZIA_<SECTION>__<KEY>`
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./zia.toml` or `./.zia.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/zia/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, ConfigError> {
        if let Some(path) = config_path
            && !path.exists()
        {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let global = Self::global_config_path();
        let project = Self::project_config_path();
        Self::figment(global.as_deref(), project.as_deref(), config_path)
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| ConfigError::Invalid(Box::new(e)))
    }

    /// Load only default configuration
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// File layers without the environment
    fn figment(global: Option<&Path>, project: Option<&Path>, explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));
        for path in [global, project, explicit].into_iter().flatten() {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            }
        }
        figment
    }

    /// Get the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("zia").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Config file locations in priority order (highest first)
    pub fn sources(config_path: Option<&Path>) -> Vec<ConfigSource> {
        let mut sources = Vec::new();

        if let Some(path) = config_path {
            sources.push(ConfigSource {
                label: "Explicit",
                path: path.to_path_buf(),
                found: path.exists(),
            });
        }

        let project = Self::project_config_path();
        sources.push(ConfigSource {
            label: "Project",
            found: project.is_some(),
            path: project.unwrap_or_else(|| PathBuf::from(PROJECT_FILES[0])),
        });

        if let Some(path) = Self::global_config_path() {
            sources.push(ConfigSource {
                label: "Global",
                found: path.exists(),
                path,
            });
        }

        sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::file_config::ModelBackend;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn toml_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", contents).unwrap();
        file
    }

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.agent.max_steps, 10);
        assert_eq!(config.model.backend, ModelBackend::Anthropic);
    }

    #[test]
    fn test_global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().ends_with("zia/config.toml"));
    }

    #[test]
    fn test_later_layers_override_earlier() {
        let global = toml_file("[agent]\nmax_steps = 3\ntime_budget_secs = 30\n");
        let project = toml_file("[agent]\nmax_steps = 7\n");

        let config: FileConfig = ConfigLoader::figment(Some(global.path()), Some(project.path()), None)
            .extract()
            .unwrap();
        assert_eq!(config.agent.max_steps, 7);
        assert_eq!(config.agent.time_budget_secs, 30);
        assert_eq!(config.model.max_tokens, 4096);
    }

    #[test]
    fn test_explicit_file_has_highest_file_priority() {
        let project = toml_file("[model]\nmodel = \"from-project\"\n");
        let explicit = toml_file("[model]\nmodel = \"from-explicit\"\n");

        let config: FileConfig =
            ConfigLoader::figment(None, Some(project.path()), Some(explicit.path()))
                .extract()
                .unwrap();
        assert_eq!(config.model.model, "from-explicit");
    }

    #[test]
    fn test_missing_explicit_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = ConfigLoader::load(Some(missing.as_path())).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_invalid_value_is_reported() {
        let bad = toml_file("[agent]\nmax_steps = \"many\"\n");
        let result: Result<FileConfig, _> = ConfigLoader::figment(None, None, Some(bad.path())).extract();
        assert!(result.is_err());
    }

    #[test]
    fn test_sources_lists_explicit_first() {
        let explicit = toml_file("");
        let sources = ConfigLoader::sources(Some(explicit.path()));
        assert_eq!(sources[0].label, "Explicit");
        assert!(sources[0].found);
    }
}
