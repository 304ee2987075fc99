use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use crate::ai::prompts;
use crate::ai::provider::{CompletionProvider, ModelInfo};
use crate::ai::response::{coerce_diagnosis, extract_json_from_text};
use crate::ai::AIError;
use crate::analyzer::Diagnosis;
use crate::config::AiConfig;

pub const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const MAX_TOKENS: u32 = 700;
const TEMPERATURE: f32 = 0.15;
const MAX_RETRIES: u32 = 3;
const INITIAL_RETRY_DELAY_MS: u64 = 1000;

pub struct OpenAiClient {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    max_retries: u32,
}

impl OpenAiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            endpoint: OPENAI_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            max_retries: MAX_RETRIES,
        }
    }

    pub fn from_config(api_key: String, config: &AiConfig) -> Result<Self, AIError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key,
            endpoint: config
                .endpoint
                .clone()
                .unwrap_or_else(|| OPENAI_API_URL.to_string()),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            max_retries: config.max_retries,
        })
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    fn chat_request(&self, problem: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: prompts::SYSTEM_PROMPT.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: prompts::build_user_prompt(problem),
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }

    /// One round trip. Rate limiting and transport failures come back as
    /// errors so the caller can decide whether to retry.
    async fn post_once(&self, request: &ChatRequest) -> Result<String, AIError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if status.as_u16() == 429 {
            let retry_after = resp
                .headers()
                .get("retry-after")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(0);
            return Err(AIError::RateLimited { retry_after });
        }
        if !status.is_success() {
            let message = resp
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AIError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let chat_resp: ChatResponse = resp
            .json()
            .await
            .map_err(|e| AIError::ParseError(format!("Failed to parse JSON: {}", e)))?;
        chat_resp
            .into_content()
            .ok_or_else(|| AIError::InvalidResponse("No content in first choice".to_string()))
    }

    async fn send_request(&self, problem: &str) -> Result<String, AIError> {
        if self.api_key.is_empty() {
            return Err(AIError::MissingApiKey);
        }

        let request = self.chat_request(problem);
        let mut backoff = Backoff::new(self.max_retries);

        loop {
            let err = match self.post_once(&request).await {
                Ok(content) => return Ok(content),
                Err(e) => e,
            };

            let delay = match &err {
                AIError::RateLimited { retry_after } => backoff.after_rate_limit(*retry_after),
                AIError::RequestFailed(_) => backoff.next_delay(),
                _ => None,
            };

            match delay {
                Some(delay) => {
                    tracing::warn!(
                        error = %err,
                        delay_ms = delay.as_millis() as u64,
                        attempt = backoff.attempts,
                        max_retries = self.max_retries,
                        "Retrying completion request"
                    );
                    sleep(delay).await;
                }
                None => return Err(err),
            }
        }
    }
}

/// Exponential backoff with a hard ceiling of `INITIAL_RETRY_DELAY_MS << max_retries`.
#[derive(Debug)]
struct Backoff {
    attempts: u32,
    max_retries: u32,
    delay_ms: u64,
    ceiling_ms: u64,
}

impl Backoff {
    fn new(max_retries: u32) -> Self {
        let ceiling_ms = INITIAL_RETRY_DELAY_MS.saturating_mul(2u64.saturating_pow(max_retries));
        Self {
            attempts: 0,
            max_retries,
            delay_ms: INITIAL_RETRY_DELAY_MS,
            ceiling_ms,
        }
    }

    /// `None` once the retry budget is spent
    fn next_delay(&mut self) -> Option<Duration> {
        if self.attempts >= self.max_retries {
            return None;
        }
        self.attempts += 1;
        let delay = self.delay_ms.min(self.ceiling_ms);
        self.delay_ms = self.delay_ms.saturating_mul(2);
        Some(Duration::from_millis(delay))
    }

    /// Honors the server's `retry-after` (seconds) but never past the ceiling.
    fn after_rate_limit(&mut self, retry_after_secs: u64) -> Option<Duration> {
        let fallback = self.next_delay()?;
        if retry_after_secs == 0 {
            return Some(fallback);
        }
        let requested = retry_after_secs.saturating_mul(1000).min(self.ceiling_ms);
        Some(Duration::from_millis(requested))
    }
}

/// Parse the assistant text into a diagnosis.
pub fn parse_diagnosis_response(response_text: &str) -> Result<Diagnosis, AIError> {
    let json_text = extract_json_from_text(response_text);
    let value: serde_json::Value = serde_json::from_str(&json_text).map_err(|e| {
        AIError::ParseError(format!(
            "Failed to parse diagnosis JSON: {}. Response: {}",
            e, response_text
        ))
    })?;
    Ok(coerce_diagnosis(&value))
}

#[async_trait]
impl CompletionProvider for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn diagnose(&self, problem: &str) -> Result<Diagnosis, AIError> {
        let response_text = self.send_request(problem).await?;
        tracing::debug!(chars = response_text.len(), "Received completion");
        parse_diagnosis_response(&response_text)
    }

    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            provider: "openai".to_string(),
            model_name: self.model.clone(),
            endpoint: self.endpoint.clone(),
            supports_json: true,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
    /// Legacy completions shape
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatResponse {
    fn into_content(self) -> Option<String> {
        let choice = self.choices.into_iter().next()?;
        choice
            .message
            .and_then(|m| m.content)
            .filter(|c| !c.is_empty())
            .or(choice.text)
    }
}
