//! Run Agent use case
//!
//! One user turn of the bounded agent loop:
//!
//! | Step | Action |
//! |------|--------|
//! | 1 | Append the user message (optionally with an image) |
//! | 2 | Check cancellation and the wall-clock budget |
//! | 3 | Send history + system prompt + tool definitions to the model |
//! | 4 | Append the assistant message; stop if it has no tool calls |
//! | 5 | Execute tool calls in order, append all results as one user message |
//! | 6 | Repeat from 2 until `max_steps` |
//!
//! A provider failure ends the turn with [`RunAgentError::Provider`]; the
//! conversation keeps everything appended so far.

mod types;

pub use types::{ImageAttachment, RunAgentError, RunAgentInput, RunAgentOutput, TurnOutcome};

use crate::config::ExecutionParams;
use crate::ports::agent_progress::{AgentProgressNotifier, NoAgentProgress};
use crate::ports::model_provider::ModelProvider;
use crate::ports::tool_executor::ToolExecutorPort;
use crate::use_cases::shared::check_cancelled;
use std::sync::Arc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use zia_domain::{Conversation, Message, Usage};

/// Use case for running one agent turn
pub struct RunAgentUseCase<M: ModelProvider + ?Sized, T: ToolExecutorPort + ?Sized> {
    provider: Arc<M>,
    tool_executor: Arc<T>,
    params: ExecutionParams,
    cancellation_token: Option<CancellationToken>,
}

impl<M, T> Clone for RunAgentUseCase<M, T>
where
    M: ModelProvider + ?Sized,
    T: ToolExecutorPort + ?Sized,
{
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
            tool_executor: self.tool_executor.clone(),
            params: self.params.clone(),
            cancellation_token: self.cancellation_token.clone(),
        }
    }
}

impl<M: ModelProvider + ?Sized, T: ToolExecutorPort + ?Sized> RunAgentUseCase<M, T> {
    pub fn new(provider: Arc<M>, tool_executor: Arc<T>) -> Self {
        Self {
            provider,
            tool_executor,
            params: ExecutionParams::default(),
            cancellation_token: None,
        }
    }

    pub fn with_params(mut self, params: ExecutionParams) -> Self {
        self.params = params;
        self
    }

    /// Set a cancellation token for graceful interruption
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub fn params(&self) -> &ExecutionParams {
        &self.params
    }

    pub async fn execute(
        &self,
        conversation: &mut Conversation,
        input: RunAgentInput,
    ) -> Result<RunAgentOutput, RunAgentError> {
        self.execute_with_progress(conversation, input, &NoAgentProgress)
            .await
    }

    pub async fn execute_with_progress(
        &self,
        conversation: &mut Conversation,
        input: RunAgentInput,
        progress: &dyn AgentProgressNotifier,
    ) -> Result<RunAgentOutput, RunAgentError> {
        let started = Instant::now();

        let user_message = match &input.image {
            Some(image) => {
                Message::user_with_image(&input.message, &image.media_type, &image.data)
            }
            None => Message::user(&input.message),
        };
        conversation.push(user_message)?;

        // Snapshot: the set offered to the model stays fixed for the turn
        let definitions = self.tool_executor.definitions();
        let tools = if definitions.is_empty() {
            None
        } else {
            Some(definitions.as_slice())
        };
        let system = input.system_prompt.as_deref();

        info!(
            provider = self.provider.name(),
            tools = definitions.len(),
            max_steps = self.params.max_steps,
            "Starting agent turn"
        );

        let mut usage = Usage::default();
        let mut tool_calls = 0;
        let mut response_text = String::new();
        let mut steps = 0;

        let outcome = loop {
            if steps >= self.params.max_steps {
                break TurnOutcome::StepLimitReached {
                    max_steps: self.params.max_steps,
                };
            }
            check_cancelled(&self.cancellation_token)?;
            if started.elapsed() >= self.params.time_budget {
                break TurnOutcome::TimeLimitReached {
                    budget: self.params.time_budget,
                };
            }

            progress.on_step_start(steps);
            debug!(step = steps, messages = conversation.len(), "Calling model provider");

            let response = self
                .provider
                .send(conversation.messages(), system, tools)
                .await
                .map_err(|e| {
                    warn!(step = steps, error = %e, "Model provider call failed");
                    RunAgentError::Provider(e)
                })?;
            steps += 1;
            usage += response.usage;
            progress.on_model_response(&response);

            response_text = response.text();
            if response.content.is_empty() {
                // Assistant messages in the history must not be empty.
                debug!(step = steps, "Model returned no content");
                break TurnOutcome::Completed;
            }
            let calls = response.tool_uses();
            conversation.push(Message::assistant(response.content))?;

            if calls.is_empty() {
                break TurnOutcome::Completed;
            }

            debug!(count = calls.len(), "Executing tool calls");
            let mut results = Vec::with_capacity(calls.len());
            for call in &calls {
                progress.on_tool_call(call);
                let result = self.tool_executor.execute(call).await;
                if result.is_error {
                    debug!(tool = %call.name, "Tool returned an error result");
                }
                progress.on_tool_result(call, &result);
                results.push(result);
            }
            tool_calls += results.len();
            conversation.push(Message::tool_results(results))?;
        };

        match &outcome {
            TurnOutcome::Completed => {
                info!(steps, tool_calls, "Agent turn completed");
            }
            other => {
                warn!(steps, tool_calls, outcome = ?other, "Agent turn stopped at a bound");
            }
        }
        progress.on_turn_end(&outcome);

        Ok(RunAgentOutput {
            outcome,
            response_text,
            steps,
            tool_calls,
            usage,
        })
    }
}
