//! Type definitions for the RunAgent use case.

use crate::ports::model_provider::ProviderError;
use std::time::Duration;
use thiserror::Error;
use zia_domain::{DomainError, Usage};

/// Errors that end a turn early.
///
/// Conversation state accumulated before the error is kept.
#[derive(Error, Debug)]
pub enum RunAgentError {
    #[error("Model provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Conversation error: {0}")]
    Conversation(#[from] DomainError),

    #[error("Operation cancelled")]
    Cancelled,
}

impl RunAgentError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunAgentError::Cancelled)
    }

    /// Whether re-sending the same turn may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            RunAgentError::Provider(e) => e.is_retryable(),
            _ => false,
        }
    }
}

/// Image attached to the user message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    /// MIME type, e.g. `image/png`
    pub media_type: String,
    /// Base64-encoded bytes
    pub data: String,
}

/// Input for the RunAgent use case
#[derive(Debug, Clone)]
pub struct RunAgentInput {
    /// The user's message
    pub message: String,
    pub image: Option<ImageAttachment>,
    /// System instruction sent with every model call
    pub system_prompt: Option<String>,
}

impl RunAgentInput {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            image: None,
            system_prompt: None,
        }
    }

    pub fn with_image(mut self, media_type: impl Into<String>, data: impl Into<String>) -> Self {
        self.image = Some(ImageAttachment {
            media_type: media_type.into(),
            data: data.into(),
        });
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }
}

/// How a turn ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The model answered without requesting tools
    Completed,
    /// The loop ran `max_steps` iterations and the model still wanted tools
    StepLimitReached { max_steps: usize },
    /// The wall-clock budget ran out between iterations
    TimeLimitReached { budget: Duration },
}

impl TurnOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, TurnOutcome::Completed)
    }

    /// User-facing notice for a bounded stop, `None` when completed.
    pub fn limit_message(&self) -> Option<String> {
        match self {
            TurnOutcome::Completed => None,
            TurnOutcome::StepLimitReached { max_steps } => Some(format!(
                "Stopped: reached the step limit ({} steps) before finishing. Send another message to continue.",
                max_steps
            )),
            TurnOutcome::TimeLimitReached { budget } => Some(format!(
                "Stopped: reached the time limit ({}s) before finishing. Send another message to continue.",
                budget.as_secs()
            )),
        }
    }
}

/// Output from the RunAgent use case
#[derive(Debug, Clone)]
pub struct RunAgentOutput {
    pub outcome: TurnOutcome,
    /// Text of the last assistant message
    pub response_text: String,
    /// Model calls made during the turn
    pub steps: usize,
    /// Tool calls executed during the turn
    pub tool_calls: usize,
    /// Token usage summed across all model calls
    pub usage: Usage,
}

impl RunAgentOutput {
    /// What to show the user: the model's answer, or the limit notice.
    pub fn display_text(&self) -> String {
        match self.outcome.limit_message() {
            Some(notice) if self.response_text.trim().is_empty() => notice,
            Some(notice) => format!("{}\n\n{}", self.response_text.trim_end(), notice),
            None => self.response_text.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_messages_are_distinct() {
        let step = TurnOutcome::StepLimitReached { max_steps: 3 }
            .limit_message()
            .unwrap();
        let time = TurnOutcome::TimeLimitReached {
            budget: Duration::from_secs(300),
        }
        .limit_message()
        .unwrap();

        assert!(step.contains("step limit"));
        assert!(time.contains("time limit"));
        assert_ne!(step, time);
        assert!(TurnOutcome::Completed.limit_message().is_none());
    }

    #[test]
    fn test_display_text_appends_notice() {
        let output = RunAgentOutput {
            outcome: TurnOutcome::StepLimitReached { max_steps: 2 },
            response_text: "Working on it.".to_string(),
            steps: 2,
            tool_calls: 2,
            usage: Usage::default(),
        };
        let text = output.display_text();
        assert!(text.starts_with("Working on it."));
        assert!(text.contains("step limit (2 steps)"));
    }

    #[test]
    fn test_retryable_follows_provider_error() {
        let err = RunAgentError::from(ProviderError::ServiceUnavailable("502".into()));
        assert!(err.is_retryable());
        assert!(!RunAgentError::Cancelled.is_retryable());
    }
}
