//! Credential-proxying backend
//!
//! The app backend holds the model API key; clients authenticate with a
//! short-lived bearer token. Requests go to `{base_url}/chat/message` with
//! the Messages API body minus `model`/`max_tokens`, and the raw Messages
//! API response comes back.
//!
//! On a 401 the token pair is refreshed once through `{base_url}/auth/refresh`
//! and the request retried.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use zia_application::{ModelProvider, ProviderError};
use zia_domain::{Message, ModelResponse, ToolDefinition};

use super::anthropic::types::{MessagesRequest, parse_response};
use super::http::{build_client, error_for_status, transport_error};
use crate::config::{DEFAULT_TIMEOUT_SECS, FileProxyConfig};

/// Bearer token pair issued by the app backend
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyTokens {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Outcome of one attempt, before the refresh decision
enum Attempt {
    Done(ModelResponse),
    Unauthorized(String),
}

pub struct ProxyProvider {
    client: reqwest::Client,
    base_url: String,
    tokens: RwLock<ProxyTokens>,
}

impl ProxyProvider {
    pub fn new(
        base_url: impl Into<String>,
        tokens: ProxyTokens,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens: RwLock::new(tokens),
        })
    }

    /// Build from `[proxy]`; `timeout_secs` comes from `[model]` and 0
    /// selects the default.
    pub fn from_file(config: &FileProxyConfig, timeout_secs: u64) -> Result<Self, ProviderError> {
        let base_url = config
            .base_url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| ProviderError::MissingCredential("[proxy] base_url is not set".into()))?;
        let timeout_secs = match timeout_secs {
            0 => DEFAULT_TIMEOUT_SECS,
            secs => secs,
        };
        Self::new(
            base_url,
            ProxyTokens {
                access_token: config.access_token.clone(),
                refresh_token: config.refresh_token.clone(),
            },
            Duration::from_secs(timeout_secs),
        )
    }

    /// Current tokens; they rotate on refresh.
    pub async fn tokens(&self) -> ProxyTokens {
        self.tokens.read().await.clone()
    }

    async fn attempt(
        &self,
        access_token: &str,
        body: &MessagesRequest<'_>,
    ) -> Result<Attempt, ProviderError> {
        let response = self
            .client
            .post(format!("{}/chat/message", self.base_url))
            .bearer_auth(access_token)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(transport_error)?;
        match status {
            200..=299 => parse_response(&text).map(Attempt::Done),
            401 => Ok(Attempt::Unauthorized(text)),
            _ => {
                warn!(status, "Proxy returned an error");
                Err(error_for_status(status, &text))
            }
        }
    }

    /// Exchange the refresh token for a new pair.
    async fn refresh(&self) -> Result<String, ProviderError> {
        let refresh_token = self
            .tokens()
            .await
            .refresh_token
            .ok_or_else(|| ProviderError::InvalidCredential("no refresh token".into()))?;

        debug!("Refreshing proxy access token");
        let response = self
            .client
            .post(format!("{}/auth/refresh", self.base_url))
            .json(&RefreshRequest {
                refresh_token: &refresh_token,
            })
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(transport_error)?;
        if !(200..300).contains(&status) {
            return Err(match error_for_status(status, &text) {
                ProviderError::InvalidCredential(msg) => {
                    ProviderError::InvalidCredential(format!("token refresh rejected: {}", msg))
                }
                other => other,
            });
        }

        let issued: TokenResponse =
            serde_json::from_str(&text).map_err(|e| ProviderError::Decode(e.to_string()))?;
        let mut tokens = self.tokens.write().await;
        tokens.access_token = Some(issued.access_token.clone());
        if let Some(refresh) = issued.refresh_token {
            tokens.refresh_token = Some(refresh);
        }
        info!("Proxy access token refreshed");
        Ok(issued.access_token)
    }
}

#[async_trait]
impl ModelProvider for ProxyProvider {
    fn name(&self) -> &str {
        "proxy"
    }

    async fn send(
        &self,
        messages: &[Message],
        system: Option<&str>,
        tools: Option<&[ToolDefinition]>,
    ) -> Result<ModelResponse, ProviderError> {
        let body = MessagesRequest::new(messages, system, tools);

        let current = self.tokens().await;
        let access_token = match current.access_token {
            Some(token) => token,
            None if current.refresh_token.is_some() => self.refresh().await?,
            None => {
                return Err(ProviderError::MissingCredential(
                    "no proxy access token configured".into(),
                ));
            }
        };

        match self.attempt(&access_token, &body).await? {
            Attempt::Done(response) => Ok(response),
            Attempt::Unauthorized(first) => {
                debug!("Proxy rejected access token, refreshing once");
                let fresh = match self.refresh().await {
                    Ok(token) => token,
                    Err(ProviderError::InvalidCredential(_)) => {
                        return Err(error_for_status(401, &first));
                    }
                    Err(e) => return Err(e),
                };
                match self.attempt(&fresh, &body).await? {
                    Attempt::Done(response) => Ok(response),
                    Attempt::Unauthorized(text) => Err(error_for_status(401, &text)),
                }
            }
        }
    }
}
