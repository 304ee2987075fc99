use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::analyzer::composer::{compose, finalize_steps};
use crate::analyzer::confidence::estimate;
use crate::analyzer::followup::follow_ups;
use crate::analyzer::matcher::{match_input, MatchSource};
use crate::analyzer::signals::{extract_signals, SignalSet};
use crate::config::ScoringConfig;
use crate::knowledge::{load_builtin, KnowledgeBase, KnowledgeError};

/// Classification result; its JSON form is the stable wire format shared
/// with the completion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Diagnosis {
    #[serde(default)]
    pub solutions: Vec<String>,
    /// 0-100, heuristic
    pub confidence: u8,
    #[serde(default)]
    pub detected_issues: Vec<String>,
    #[serde(default)]
    pub follow_up_questions: Vec<String>,
    /// Only filled in by the completion service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

pub trait ClassificationStrategy: Send + Sync {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn classify(&self, input: &str, kb: &KnowledgeBase, scoring: &ScoringConfig) -> Diagnosis;
}

/// Tag-based multi-signal classification. Every detected tag contributes
/// its steps, blended in detection order.
pub struct SignalStrategy;

impl ClassificationStrategy for SignalStrategy {
    fn id(&self) -> &str {
        "signal"
    }

    fn name(&self) -> &str {
        "Multi-signal tag classifier"
    }

    fn classify(&self, input: &str, kb: &KnowledgeBase, scoring: &ScoringConfig) -> Diagnosis {
        let signals = extract_signals(input, kb);
        let tags = &signals.issue_tags;

        Diagnosis {
            solutions: compose(tags, signals.device, input, kb, scoring.max_solutions),
            confidence: estimate(&signals, tags, scoring),
            follow_up_questions: follow_ups(tags, kb, scoring.max_follow_ups),
            detected_issues: signals.issue_tags.clone(),
            reasoning: None,
        }
    }
}

/// Single best keyword match. Runs the same composer, estimator and
/// follow-up stages, restricted to the winning tag.
pub struct KeywordStrategy;

impl ClassificationStrategy for KeywordStrategy {
    fn id(&self) -> &str {
        "keyword"
    }

    fn name(&self) -> &str {
        "Phrase/word keyword matcher"
    }

    fn classify(&self, input: &str, kb: &KnowledgeBase, scoring: &ScoringConfig) -> Diagnosis {
        let signals = extract_signals(input, kb);
        let matched = match_input(input, kb, scoring);
        let tags = vec![matched.tag.clone()];

        let solutions = match matched.source {
            MatchSource::Category => compose(&tags, signals.device, input, kb, scoring.max_solutions),
            MatchSource::Fallback | MatchSource::Generic => {
                finalize_steps(matched.steps, scoring.max_solutions)
            }
        };

        Diagnosis {
            solutions,
            confidence: estimate(&signals, &tags, scoring),
            follow_up_questions: follow_ups(&tags, kb, scoring.max_follow_ups),
            detected_issues: tags,
            reasoning: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    Signal,
    Keyword,
}

impl StrategyKind {
    pub fn build(&self) -> Arc<dyn ClassificationStrategy> {
        match self {
            StrategyKind::Signal => Arc::new(SignalStrategy),
            StrategyKind::Keyword => Arc::new(KeywordStrategy),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Signal => write!(f, "signal"),
            StrategyKind::Keyword => write!(f, "keyword"),
        }
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "signal" => Ok(StrategyKind::Signal),
            "keyword" => Ok(StrategyKind::Keyword),
            other => Err(format!("unknown strategy '{}'", other)),
        }
    }
}

/// Deterministic classifier over an injected knowledge base.
///
/// Holds only immutable state, so one instance can be shared across
/// threads and tasks behind an `Arc`.
#[derive(Clone)]
pub struct Classifier {
    knowledge: Arc<KnowledgeBase>,
    scoring: ScoringConfig,
    strategy: Arc<dyn ClassificationStrategy>,
}

impl Classifier {
    pub fn new(knowledge: Arc<KnowledgeBase>, scoring: ScoringConfig) -> Self {
        Self {
            knowledge,
            scoring,
            strategy: Arc::new(SignalStrategy),
        }
    }

    /// Classifier over the embedded tables with default weights
    pub fn builtin() -> Result<Self, KnowledgeError> {
        Ok(Self::new(Arc::new(load_builtin()?), ScoringConfig::default()))
    }

    pub fn with_strategy(mut self, strategy: Arc<dyn ClassificationStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn strategy_id(&self) -> &str {
        self.strategy.id()
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn scoring(&self) -> &ScoringConfig {
        &self.scoring
    }

    pub fn extract_signals(&self, input: &str) -> SignalSet {
        extract_signals(input, &self.knowledge)
    }

    pub fn classify(&self, input: &str) -> Diagnosis {
        let diagnosis = self.strategy.classify(input, &self.knowledge, &self.scoring);
        tracing::debug!(
            strategy = self.strategy.id(),
            issues = ?diagnosis.detected_issues,
            confidence = diagnosis.confidence,
            "Classified problem"
        );
        diagnosis
    }
}

impl fmt::Debug for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Classifier")
            .field("strategy", &self.strategy.id())
            .field("categories", &self.knowledge.categories.len())
            .field("scoring", &self.scoring)
            .finish()
    }
}
