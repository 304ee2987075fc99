//! Completion Provider Trait
//!
//! Common interface for the remote services that can diagnose a problem
//! (the chat-completions API directly, or an HTTP proxy in front of it).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::ai::openai::OpenAiClient;
use crate::ai::proxy::ProxyClient;
use crate::ai::AIError;
use crate::analyzer::Diagnosis;
use crate::config::{AiConfig, ProviderKind};

/// Information about the model behind a provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Provider name (e.g., "openai", "proxy")
    pub provider: String,

    /// Model name (e.g., "gpt-4o-mini"); proxies report what they were configured with
    pub model_name: String,

    pub endpoint: String,

    /// Whether the model reliably outputs JSON
    pub supports_json: bool,
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the provider is configured well enough to be called
    async fn is_available(&self) -> bool;

    /// Diagnose a free-text problem. The reply is coerced field by field, so
    /// a malformed but parseable JSON object still yields a diagnosis.
    async fn diagnose(&self, problem: &str) -> Result<Diagnosis, AIError>;

    fn model_info(&self) -> ModelInfo;
}

/// Build the provider selected in the config.
///
/// The direct API needs a key; the proxy holds its own key and only needs
/// an endpoint (a local default is used when none is configured).
pub fn build_provider(config: &AiConfig) -> Result<Arc<dyn CompletionProvider>, AIError> {
    let provider: Arc<dyn CompletionProvider> = match config.provider {
        ProviderKind::Openai => {
            let api_key = config
                .api_key
                .as_deref()
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .ok_or(AIError::MissingApiKey)?;
            Arc::new(OpenAiClient::from_config(api_key.to_string(), config)?)
        }
        ProviderKind::Proxy => Arc::new(ProxyClient::from_config(config)?),
    };

    tracing::info!(
        provider = provider.name(),
        model = %provider.model_info().model_name,
        "Completion provider ready"
    );
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_requires_key() {
        let config = AiConfig::default();
        assert!(matches!(build_provider(&config), Err(AIError::MissingApiKey)));

        let config = AiConfig {
            api_key: Some("  ".to_string()),
            ..AiConfig::default()
        };
        assert!(matches!(build_provider(&config), Err(AIError::MissingApiKey)));
    }

    #[test]
    fn test_provider_selection() {
        let config = AiConfig {
            api_key: Some("sk-test".to_string()),
            ..AiConfig::default()
        };
        let provider = build_provider(&config).unwrap();
        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.model_info().model_name, "gpt-4o-mini");

        let config = AiConfig {
            provider: ProviderKind::Proxy,
            endpoint: Some("http://127.0.0.1:9/api/ai".to_string()),
            ..AiConfig::default()
        };
        let provider = build_provider(&config).unwrap();
        assert_eq!(provider.name(), "proxy");
        assert_eq!(provider.model_info().endpoint, "http://127.0.0.1:9/api/ai");
    }
}
