//! Agent loop configuration from TOML (`[agent]` section)

use serde::{Deserialize, Serialize};
use std::time::Duration;
use zia_application::ExecutionParams;
use zia_application::config::execution_params::{DEFAULT_MAX_STEPS, DEFAULT_TIME_BUDGET};

use super::{ConfigIssue, Severity};

/// Raw agent configuration from TOML
///
/// # Example
///
/// ```toml
/// [agent]
/// max_steps = 10
/// time_budget_secs = 300
/// system_prompt = "You are a helpful assistant."
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentConfig {
    /// Model calls allowed per turn
    pub max_steps: usize,
    /// Wall-clock budget per turn
    pub time_budget_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

impl Default for FileAgentConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            time_budget_secs: DEFAULT_TIME_BUDGET.as_secs(),
            system_prompt: None,
        }
    }
}

impl FileAgentConfig {
    /// Loop bounds; zero values fall back to the defaults.
    pub fn to_execution_params(&self) -> ExecutionParams {
        let max_steps = if self.max_steps == 0 {
            DEFAULT_MAX_STEPS
        } else {
            self.max_steps
        };
        let time_budget = if self.time_budget_secs == 0 {
            DEFAULT_TIME_BUDGET
        } else {
            Duration::from_secs(self.time_budget_secs)
        };
        ExecutionParams::default()
            .with_max_steps(max_steps)
            .with_time_budget(time_budget)
    }

    pub(super) fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.max_steps == 0 {
            issues.push(ConfigIssue::new(
                Severity::Warning,
                "agent.max_steps",
                format!("max_steps is 0, falling back to {}", DEFAULT_MAX_STEPS),
            ));
        }
        if self.time_budget_secs == 0 {
            issues.push(ConfigIssue::new(
                Severity::Warning,
                "agent.time_budget_secs",
                format!(
                    "time_budget_secs is 0, falling back to {}",
                    DEFAULT_TIME_BUDGET.as_secs()
                ),
            ));
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_params_from_config() {
        let config = FileAgentConfig {
            max_steps: 4,
            time_budget_secs: 60,
            system_prompt: None,
        };
        let params = config.to_execution_params();
        assert_eq!(params.max_steps, 4);
        assert_eq!(params.time_budget, Duration::from_secs(60));
    }

    #[test]
    fn test_zero_values_fall_back() {
        let config = FileAgentConfig {
            max_steps: 0,
            time_budget_secs: 0,
            system_prompt: None,
        };
        let params = config.to_execution_params();
        assert_eq!(params.max_steps, DEFAULT_MAX_STEPS);
        assert_eq!(params.time_budget, DEFAULT_TIME_BUDGET);
        assert_eq!(config.validate().len(), 2);
    }
}
