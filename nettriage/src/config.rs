//! Runtime configuration.
//!
//! Everything is optional in the JSON file; missing fields take the
//! canonical defaults. A few values can be overridden from the environment.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::analyzer::engine::StrategyKind;

pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_AI_URL: &str = "NETTRIAGE_AI_URL";
pub const ENV_DB_PATH: &str = "NETTRIAGE_DB";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Weights of the keyword scorer and the confidence formula.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringConfig {
    pub confidence_base: u32,
    /// Added when exactly one issue tag was detected
    pub single_issue_bonus: u32,
    /// Added when the description contains digits
    pub numeric_bonus: u32,
    /// Added when the token count exceeds `detail_threshold`
    pub detail_bonus: u32,
    pub detail_threshold: usize,
    pub common_issue_bonus: u32,
    pub common_issue_tags: Vec<String>,
    pub confidence_cap: u32,
    /// Points per word of a trigger phrase found verbatim
    pub phrase_weight: u32,
    /// Points per trigger word found as a whole token
    pub word_weight: u32,
    pub max_solutions: usize,
    pub max_follow_ups: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            confidence_base: 70,
            single_issue_bonus: 15,
            numeric_bonus: 10,
            detail_bonus: 10,
            detail_threshold: 5,
            common_issue_bonus: 5,
            common_issue_tags: vec![
                "performance".to_string(),
                "connection_failure".to_string(),
            ],
            confidence_cap: 98,
            phrase_weight: 2,
            word_weight: 1,
            max_solutions: 4,
            max_follow_ups: 2,
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.confidence_cap > 100 {
            return Err(ConfigError::Invalid(format!(
                "confidence_cap {} exceeds 100",
                self.confidence_cap
            )));
        }
        if self.confidence_base > self.confidence_cap {
            return Err(ConfigError::Invalid(format!(
                "confidence_base {} is above confidence_cap {}",
                self.confidence_base, self.confidence_cap
            )));
        }
        if self.max_solutions == 0 {
            return Err(ConfigError::Invalid("max_solutions must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Chat-completions API called directly
    #[default]
    Openai,
    /// HTTP proxy that accepts `{"problem": ...}` and returns the diagnosis JSON
    Proxy,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AiConfig {
    #[serde(default)]
    pub provider: ProviderKind,
    #[serde(default = "default_model")]
    pub model: String,
    /// Overrides the provider's default endpoint
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Never written back out; normally supplied via `OPENAI_API_KEY`
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    700
}

fn default_temperature() -> f32 {
    0.15
}

fn default_max_retries() -> u32 {
    3
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            model: default_model(),
            endpoint: None,
            api_key: None,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryConfig {
    /// SQLite file; history is disabled when unset
    #[serde(default)]
    pub db_path: Option<PathBuf>,
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
}

fn default_recent_limit() -> usize {
    10
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            recent_limit: default_recent_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TriageConfig {
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    /// Replaces the built-in knowledge base
    #[serde(default)]
    pub knowledge_path: Option<PathBuf>,
    #[serde(default)]
    pub strategy: StrategyKind,
}

impl TriageConfig {
    /// Read a JSON config file, apply environment overrides and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_json_str(&content)?;
        config.apply_env();
        config.validate()?;
        tracing::debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key/value source; blank values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = value(ENV_API_KEY) {
            self.ai.api_key = Some(key);
        }
        if let Some(url) = value(ENV_AI_URL) {
            self.ai.endpoint = Some(url);
        }
        if let Some(path) = value(ENV_DB_PATH) {
            self.history.db_path = Some(PathBuf::from(path));
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scoring.validate()?;
        if !(0.0..=2.0).contains(&self.ai.temperature) {
            return Err(ConfigError::Invalid(format!(
                "temperature {} outside 0.0..=2.0",
                self.ai.temperature
            )));
        }
        Ok(())
    }
}
