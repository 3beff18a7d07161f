//! Model backends
//!
//! Each backend implements [`ModelProvider`]: it turns the normalized
//! conversation into its wire format, sends it, and maps the reply and
//! any failure back into domain types.
//!
//! - [`anthropic`]: the Messages API, authenticated with an API key
//! - [`proxy`]: the app backend that holds the key on the client's behalf

pub mod anthropic;
pub(crate) mod http;
pub mod proxy;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use tracing::info;
use zia_application::{ModelProvider, ProviderError};

use crate::config::{FileConfig, ModelBackend};
use anthropic::{AnthropicConfig, AnthropicProvider};
use proxy::ProxyProvider;

/// Build the backend selected by `[model] backend`.
pub fn provider_from_config(
    config: &FileConfig,
) -> Result<Arc<dyn ModelProvider>, ProviderError> {
    let provider: Arc<dyn ModelProvider> = match config.model.backend {
        ModelBackend::Anthropic => {
            Arc::new(AnthropicProvider::new(AnthropicConfig::from_file(&config.model))?)
        }
        ModelBackend::Proxy => Arc::new(ProxyProvider::from_file(
            &config.proxy,
            config.model.timeout_secs,
        )?),
    };
    info!(backend = provider.name(), "Model backend ready");
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selects_backend() {
        let config = FileConfig::default();
        assert_eq!(provider_from_config(&config).unwrap().name(), "anthropic");

        let mut config = FileConfig::default();
        config.model.backend = ModelBackend::Proxy;
        config.proxy.base_url = Some("http://127.0.0.1:8000".into());
        assert_eq!(provider_from_config(&config).unwrap().name(), "proxy");
    }

    #[test]
    fn test_proxy_without_base_url() {
        let mut config = FileConfig::default();
        config.model.backend = ModelBackend::Proxy;
        assert!(matches!(
            provider_from_config(&config),
            Err(ProviderError::MissingCredential(_))
        ));
    }
}
