//! Direct Anthropic Messages API backend

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};
use zia_application::{ModelProvider, ProviderError};
use zia_domain::{Message, ModelResponse, ToolDefinition};

use super::types::{MessagesRequest, parse_response};
use crate::config::{
    API_KEY_ENV, DEFAULT_API_URL, DEFAULT_API_VERSION, DEFAULT_MAX_TOKENS, DEFAULT_MODEL,
    DEFAULT_TIMEOUT_SECS, FileModelConfig,
};
use crate::providers::http::{build_client, error_for_status, transport_error};

/// Connection settings for [`AnthropicProvider`]
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub api_url: String,
    pub api_version: String,
    pub timeout: Duration,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            api_url: DEFAULT_API_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl AnthropicConfig {
    pub fn from_file(config: &FileModelConfig) -> Self {
        let timeout_secs = match config.timeout_secs {
            0 => DEFAULT_TIMEOUT_SECS,
            secs => secs,
        };
        Self {
            api_key: config.resolved_api_key(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            api_url: config.api_url.clone(),
            api_version: config.api_version.clone(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }
}

/// Model backend calling the Messages API with an API key.
pub struct AnthropicProvider {
    client: reqwest::Client,
    config: AnthropicConfig,
}

impl AnthropicProvider {
    pub fn new(config: AnthropicConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client(config.timeout)?,
            config,
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl ModelProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn send(
        &self,
        messages: &[Message],
        system: Option<&str>,
        tools: Option<&[ToolDefinition]>,
    ) -> Result<ModelResponse, ProviderError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ProviderError::MissingCredential(format!("{} is not set", API_KEY_ENV)))?;

        let body = MessagesRequest::new(messages, system, tools)
            .with_model(&self.config.model, self.config.max_tokens);
        debug!(
            model = %self.config.model,
            messages = messages.len(),
            tools = body.tools.as_ref().map_or(0, Vec::len),
            "Sending Messages API request"
        );

        let response = self
            .client
            .post(&self.config.api_url)
            .header("x-api-key", api_key)
            .header("anthropic-version", &self.config.api_version)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;
        if !status.is_success() {
            warn!(status = status.as_u16(), "Messages API returned an error");
            return Err(error_for_status(status.as_u16(), &text));
        }

        let parsed = parse_response(&text)?;
        debug!(
            stop_reason = ?parsed.stop_reason,
            input_tokens = parsed.usage.input_tokens,
            output_tokens = parsed.usage.output_tokens,
            "Messages API response"
        );
        Ok(parsed)
    }
}
