//! Client for an HTTP proxy that fronts the completion service.
//!
//! The proxy owns the API key. It accepts `{"problem": "..."}` and answers
//! with the diagnosis JSON object directly.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::ai::provider::{CompletionProvider, ModelInfo};
use crate::ai::response::{coerce_diagnosis, extract_json_from_text};
use crate::ai::AIError;
use crate::analyzer::Diagnosis;
use crate::config::AiConfig;

pub const DEFAULT_PROXY_URL: &str = "http://localhost:3333/api/ai";

#[derive(Debug, Serialize)]
struct ProxyRequest<'a> {
    problem: &'a str,
}

pub struct ProxyClient {
    client: Client,
    endpoint: String,
    model: String,
}

impl ProxyClient {
    pub fn new(endpoint: String) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            model: "proxy".to_string(),
        }
    }

    pub fn from_config(config: &AiConfig) -> Result<Self, AIError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config
                .endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_PROXY_URL.to_string()),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl CompletionProvider for ProxyClient {
    fn name(&self) -> &str {
        "proxy"
    }

    async fn is_available(&self) -> bool {
        !self.endpoint.is_empty()
    }

    async fn diagnose(&self, problem: &str) -> Result<Diagnosis, AIError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&ProxyRequest { problem })
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Proxy returned an error");
            return Err(AIError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let value: serde_json::Value = serde_json::from_str(&extract_json_from_text(&body))
            .map_err(|e| AIError::ParseError(format!("Proxy reply is not JSON: {}", e)))?;
        Ok(coerce_diagnosis(&value))
    }

    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            provider: "proxy".to_string(),
            model_name: self.model.clone(),
            endpoint: self.endpoint.clone(),
            supports_json: true,
        }
    }
}
