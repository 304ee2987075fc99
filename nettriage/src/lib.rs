//! NetTriage - rule-based network problem diagnosis
//!
//! This library turns a free-text description of a network problem ("my
//! wifi keeps dropping on my phone") into an ordered list of remediation
//! steps, a heuristic confidence score, the detected issue tags and a few
//! clarifying follow-up questions.
//!
//! # Quick Start
//!
//! ```rust
//! use nettriage::Classifier;
//!
//! let classifier = Classifier::builtin().unwrap();
//! let diagnosis = classifier.classify("My laptop wifi is really slow");
//!
//! assert_eq!(diagnosis.detected_issues, vec!["performance"]);
//! for (i, step) in diagnosis.solutions.iter().enumerate() {
//!     println!("{}. {}", i + 1, step);
//! }
//! ```
//!
//! # Features
//!
//! - **Deterministic classification**: signal extraction, keyword scoring,
//!   device-aware step composition, confidence estimation
//! - **Replaceable knowledge base**: JSON tables, built in or loaded from disk
//! - **Optional AI**: chat-completions API or an HTTP proxy, with defensive
//!   parsing of whatever comes back
//! - **History**: SQLite-backed record of past diagnoses

pub mod ai;
pub mod analyzer;
pub mod config;
pub mod core;
pub mod history;
pub mod knowledge;

// Re-export main types
pub use analyzer::{
    ClassificationStrategy, Classifier, Diagnosis, KeywordStrategy, SignalSet, SignalStrategy,
    StrategyKind,
};
pub use config::{AiConfig, ConfigError, HistoryConfig, ProviderKind, ScoringConfig, TriageConfig};
pub use crate::core::{DiagnoseOptions, DiagnosisReport, DiagnosisSource, TriageError, Troubleshooter};
pub use history::{HistoryEntry, HistoryStore, SqliteHistory};
pub use knowledge::{DeviceKind, KnowledgeBase, KnowledgeError};

/// Classify a problem with the built-in tables and default weights.
pub fn diagnose(problem: &str) -> Result<Diagnosis, KnowledgeError> {
    Ok(Classifier::builtin()?.classify(problem))
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        Classifier, DiagnoseOptions, Diagnosis, DiagnosisReport, StrategyKind, TriageConfig,
        TriageError, Troubleshooter,
    };
}
