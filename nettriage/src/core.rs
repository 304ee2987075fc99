//! Troubleshooting facade shared by the CLI and library users.
//!
//! Wires the classifier, the optional completion provider and the optional
//! history store together behind one type.

use std::sync::Arc;

use serde::Serialize;

use crate::ai::{build_provider, AIError, CompletionProvider};
use crate::analyzer::{Classifier, Diagnosis, SignalSet};
use crate::config::{ConfigError, TriageConfig};
use crate::history::{BestEffortHistory, HistoryEntry, HistoryError, HistoryStore, SqliteHistory};
use crate::knowledge::{load_builtin, load_from_file, KnowledgeError};

#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    #[error("Knowledge base error: {0}")]
    Knowledge(#[from] KnowledgeError),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("AI error: {0}")]
    Ai(#[from] AIError),
    #[error("History error: {0}")]
    History(#[from] HistoryError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Problem description is empty")]
    EmptyProblem,
}

/// Options for a single diagnosis run.
#[derive(Clone, Debug)]
pub struct DiagnoseOptions {
    /// Ask the completion provider instead of the rule tables
    pub use_ai: bool,
    pub save_history: bool,
}

impl Default for DiagnoseOptions {
    fn default() -> Self {
        Self {
            use_ai: false,
            save_history: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosisSource {
    Rules,
    Ai,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisReport {
    pub problem: String,
    pub diagnosis: Diagnosis,
    pub source: DiagnosisSource,
    /// Set when the run was written to history
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_id: Option<String>,
}

pub struct Troubleshooter {
    classifier: Classifier,
    provider: Option<Arc<dyn CompletionProvider>>,
    history: Option<BestEffortHistory<Box<dyn HistoryStore>>>,
    recent_limit: usize,
}

impl Troubleshooter {
    pub fn new(classifier: Classifier) -> Self {
        Self {
            classifier,
            provider: None,
            history: None,
            recent_limit: 10,
        }
    }

    /// Rule tables only: no provider, no history
    pub fn builtin() -> Result<Self, TriageError> {
        Ok(Self::new(Classifier::builtin()?))
    }

    /// Build everything the config asks for.
    ///
    /// A history database that cannot be opened is logged and skipped. A
    /// missing API key leaves the provider unset; the AI path then fails
    /// with [`AIError::MissingApiKey`] when it is actually used.
    pub fn from_config(config: &TriageConfig) -> Result<Self, TriageError> {
        config.validate()?;

        let knowledge = match &config.knowledge_path {
            Some(path) => load_from_file(path)?,
            None => load_builtin()?,
        };
        let classifier = Classifier::new(Arc::new(knowledge), config.scoring.clone())
            .with_strategy(config.strategy.build());

        let mut troubleshooter = Self::new(classifier);
        troubleshooter.recent_limit = config.history.recent_limit;

        if let Some(db_path) = &config.history.db_path {
            match SqliteHistory::new(db_path) {
                Ok(store) => troubleshooter = troubleshooter.with_history(store),
                Err(e) => tracing::warn!("History disabled, cannot open {:?}: {}", db_path, e),
            }
        }

        match build_provider(&config.ai) {
            Ok(provider) => troubleshooter.provider = Some(provider),
            Err(AIError::MissingApiKey) => {
                tracing::debug!("No API key configured, AI diagnosis unavailable")
            }
            Err(e) => return Err(e.into()),
        }

        Ok(troubleshooter)
    }

    pub fn with_provider(mut self, provider: Arc<dyn CompletionProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_history<S: HistoryStore + 'static>(mut self, store: S) -> Self {
        let boxed: Box<dyn HistoryStore> = Box::new(store);
        self.history = Some(BestEffortHistory::new(boxed));
        self
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn provider(&self) -> Option<&Arc<dyn CompletionProvider>> {
        self.provider.as_ref()
    }

    pub fn has_history(&self) -> bool {
        self.history.is_some()
    }

    pub fn signals(&self, problem: &str) -> SignalSet {
        self.classifier.extract_signals(problem)
    }

    /// Rule-based diagnosis; never fails and never touches the network.
    pub fn diagnose_offline(&self, problem: &str) -> Diagnosis {
        self.classifier.classify(problem)
    }

    pub async fn diagnose_with_ai(&self, problem: &str) -> Result<Diagnosis, TriageError> {
        let problem = problem.trim();
        if problem.is_empty() {
            return Err(TriageError::EmptyProblem);
        }
        let provider = self.provider.as_ref().ok_or(AIError::MissingApiKey)?;
        tracing::info!(provider = provider.name(), "Requesting AI diagnosis");
        Ok(provider.diagnose(problem).await?)
    }

    /// Run one diagnosis and record it in history when enabled.
    pub async fn diagnose(
        &self,
        problem: &str,
        options: &DiagnoseOptions,
    ) -> Result<DiagnosisReport, TriageError> {
        let (diagnosis, source) = if options.use_ai {
            (self.diagnose_with_ai(problem).await?, DiagnosisSource::Ai)
        } else {
            (self.diagnose_offline(problem), DiagnosisSource::Rules)
        };

        let history_id = match &self.history {
            Some(history) if options.save_history && !problem.trim().is_empty() => history
                .record(problem.trim(), &diagnosis.solutions)
                .map(|entry| entry.id),
            _ => None,
        };

        Ok(DiagnosisReport {
            problem: problem.trim().to_string(),
            diagnosis,
            source,
            history_id,
        })
    }

    /// Most recent entries, newest first. Empty when history is disabled or
    /// unreadable.
    pub fn recent_history(&self, limit: Option<usize>) -> Vec<HistoryEntry> {
        match &self.history {
            Some(history) => history.recent(limit.unwrap_or(self.recent_limit)),
            None => Vec::new(),
        }
    }
}
