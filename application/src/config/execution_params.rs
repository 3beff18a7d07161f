//! Execution parameters: agent loop bounds.
//!
//! [`ExecutionParams`] groups the static parameters that bound one turn of
//! [`RunAgentUseCase`](crate::use_cases::run_agent::RunAgentUseCase).

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default maximum model round-trips per turn.
pub const DEFAULT_MAX_STEPS: usize = 10;

/// Default wall-clock budget per turn.
pub const DEFAULT_TIME_BUDGET: Duration = Duration::from_secs(300);

/// Agent loop control parameters.
///
/// The time budget is checked at the top of every iteration, so a single
/// slow model or tool call may overrun it by that call's duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionParams {
    /// Maximum number of model calls in one turn.
    pub max_steps: usize,
    /// Wall-clock ceiling measured from loop entry.
    pub time_budget: Duration,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            time_budget: DEFAULT_TIME_BUDGET,
        }
    }
}

impl ExecutionParams {
    // ==================== Builder Methods ====================

    pub fn with_max_steps(mut self, max: usize) -> Self {
        self.max_steps = max;
        self
    }

    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = budget;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = ExecutionParams::default();
        assert_eq!(params.max_steps, 10);
        assert_eq!(params.time_budget, Duration::from_secs(300));
    }

    #[test]
    fn test_builders() {
        let params = ExecutionParams::default()
            .with_max_steps(3)
            .with_time_budget(Duration::from_secs(5));
        assert_eq!(params.max_steps, 3);
        assert_eq!(params.time_budget, Duration::from_secs(5));
    }
}
