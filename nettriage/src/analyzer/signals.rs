//! Signal Extractor
//!
//! Derives normalized features from the raw problem description: tokens,
//! issue tags, device archetype, urgency and emotional-tone cues. Pure and
//! total: every string, including the empty one, yields a signal set.

use serde::{Deserialize, Serialize};

use crate::knowledge::{DeviceKind, KnowledgeBase};

/// Features extracted from a single problem description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalSet {
    /// Lower-cased, whitespace-separated words
    pub tokens: Vec<String>,
    /// Detected issue tags in table order; never empty
    pub issue_tags: Vec<String>,
    pub device: DeviceKind,
    pub urgent: bool,
    pub emotions: Vec<String>,
    pub has_numbers: bool,
    pub token_count: usize,
}

impl SignalSet {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.issue_tags.iter().any(|t| t == tag)
    }

    pub fn has_token(&self, word: &str) -> bool {
        self.tokens.iter().any(|t| t == word)
    }
}

pub fn tokenize(lowered: &str) -> Vec<String> {
    lowered.split_whitespace().map(str::to_string).collect()
}

pub fn extract_signals(input: &str, kb: &KnowledgeBase) -> SignalSet {
    let lowered = input.to_lowercase();
    let tokens = tokenize(&lowered);

    let urgent = tokens
        .iter()
        .any(|t| kb.lexicon.urgency_words.iter().any(|w| w == t));

    let mut emotions: Vec<String> = Vec::new();
    for token in &tokens {
        if kb.lexicon.emotion_words.iter().any(|w| w == token) && !emotions.contains(token) {
            emotions.push(token.clone());
        }
    }

    let signals = SignalSet {
        issue_tags: detect_issue_tags(&lowered, kb),
        device: detect_device(&lowered, kb),
        urgent,
        emotions,
        has_numbers: input.chars().any(|c| c.is_ascii_digit()),
        token_count: tokens.len(),
        tokens,
    };

    tracing::debug!(
        tags = ?signals.issue_tags,
        device = %signals.device,
        urgent = signals.urgent,
        "Extracted signals"
    );
    signals
}

/// Every category whose detection conditions fire, or the default tag alone.
pub fn detect_issue_tags(lowered: &str, kb: &KnowledgeBase) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for category in &kb.categories {
        if category.detects(lowered) && !tags.contains(&category.tag) {
            tags.push(category.tag.clone());
        }
    }
    if tags.is_empty() {
        tags.push(kb.default_tag.clone());
    }
    tags
}

/// First device profile with a keyword in the text wins.
pub fn detect_device(lowered: &str, kb: &KnowledgeBase) -> DeviceKind {
    kb.devices
        .iter()
        .find(|profile| profile.keywords.iter().any(|k| lowered.contains(k.as_str())))
        .map(|profile| profile.device)
        .unwrap_or_default()
}
