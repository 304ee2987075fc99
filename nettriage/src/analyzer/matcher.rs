//! Pattern Matcher
//!
//! Scores every category against the input with an additive phrase/word
//! rule and picks the best one. A trigger phrase found verbatim earns
//! `phrase_weight` per word in the phrase; independently, every trigger word
//! that appears as a whole token earns `word_weight`. The strictly highest
//! total wins and ties keep the earlier category.

use serde::{Deserialize, Serialize};

use crate::analyzer::signals::tokenize;
use crate::config::ScoringConfig;
use crate::knowledge::{CategoryRule, KnowledgeBase};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    /// A category scored above zero
    Category,
    /// No category scored; a hand-picked fallback matched
    Fallback,
    /// Nothing matched at all
    Generic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseMatch {
    pub tag: String,
    pub score: u32,
    pub source: MatchSource,
    /// Base steps of the winner (device branches are applied by the composer)
    pub steps: Vec<String>,
}

/// Score a single category against lower-cased input and its tokens.
pub fn score_rule(rule: &CategoryRule, lowered: &str, tokens: &[String], scoring: &ScoringConfig) -> u32 {
    let mut score = 0;
    for phrase in &rule.triggers {
        let words: Vec<&str> = phrase.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }
        if lowered.contains(phrase.as_str()) {
            score += scoring.phrase_weight * words.len() as u32;
        }
        for word in &words {
            if tokens.iter().any(|t| t == word) {
                score += scoring.word_weight;
            }
        }
    }
    score
}

/// Best-scoring category, or `None` when every score is zero.
pub fn best_category<'a>(
    lowered: &str,
    tokens: &[String],
    kb: &'a KnowledgeBase,
    scoring: &ScoringConfig,
) -> Option<(&'a CategoryRule, u32)> {
    let mut best: Option<(&CategoryRule, u32)> = None;
    for rule in &kb.categories {
        let score = score_rule(rule, lowered, tokens, scoring);
        tracing::trace!(tag = %rule.tag, score, "Scored category");
        let current = best.map(|(_, s)| s).unwrap_or(0);
        if score > current {
            best = Some((rule, score));
        }
    }
    best
}

pub fn match_input(input: &str, kb: &KnowledgeBase, scoring: &ScoringConfig) -> PhraseMatch {
    let lowered = input.to_lowercase();
    let tokens = tokenize(&lowered);

    if let Some((rule, score)) = best_category(&lowered, &tokens, kb, scoring) {
        tracing::debug!(tag = %rule.tag, score, "Keyword match");
        return PhraseMatch {
            tag: rule.tag.clone(),
            score,
            source: MatchSource::Category,
            steps: rule.steps.clone(),
        };
    }

    if let Some(fallback) = kb.fallbacks.iter().find(|f| f.matches(&lowered)) {
        tracing::debug!(tag = %fallback.tag, "No category scored, using fallback rule");
        return PhraseMatch {
            tag: fallback.tag.clone(),
            score: 0,
            source: MatchSource::Fallback,
            steps: fallback.steps.clone(),
        };
    }

    PhraseMatch {
        tag: kb.default_tag.clone(),
        score: 0,
        source: MatchSource::Generic,
        steps: kb.generic_fallback(input),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::{load_builtin, Lexicon};

    fn category(tag: &str, triggers: &[&str]) -> CategoryRule {
        CategoryRule {
            tag: tag.to_string(),
            description: String::new(),
            detect: vec![],
            triggers: triggers.iter().map(|t| t.to_string()).collect(),
            steps: vec![format!("{} step", tag)],
            device_variant: None,
        }
    }

    fn table(categories: Vec<CategoryRule>) -> KnowledgeBase {
        KnowledgeBase {
            categories,
            fallbacks: vec![],
            generic_steps: vec!["Check \"{problem}\"".to_string()],
            default_tag: "general_connectivity".to_string(),
            devices: vec![],
            symptoms: vec![],
            follow_ups: vec![],
            lexicon: Lexicon::default(),
        }
    }

    #[test]
    fn test_phrase_and_word_scores_add_up() {
        let rule = category("perf", &["slow internet"]);
        let lowered = "my slow internet";
        let tokens = tokenize(lowered);
        // 2 * 2 for the phrase, +1 for "slow", +1 for "internet"
        assert_eq!(score_rule(&rule, lowered, &tokens, &ScoringConfig::default()), 6);
    }

    #[test]
    fn test_word_overlap_without_phrase_hit() {
        let rule = category("perf", &["slow internet"]);
        let lowered = "internet is slow";
        let tokens = tokenize(lowered);
        assert_eq!(score_rule(&rule, lowered, &tokens, &ScoringConfig::default()), 2);
    }

    #[test]
    fn test_phrase_bonus_dominates() {
        let words = category("words", &["router hub", "reboot cycle"]);
        let phrase = category("phrase", &["keeps dropping out"]);
        let scoring = ScoringConfig::default();

        let lowered = "router reboot";
        let tokens = tokenize(lowered);
        assert_eq!(score_rule(&words, lowered, &tokens, &scoring), 2);
        assert_eq!(score_rule(&phrase, "keeps dropping out", &[], &scoring), 6);

        // the phrase rule wins even though it comes second in the table
        let kb = table(vec![words, phrase]);
        let m = match_input("router reboot keeps dropping out", &kb, &scoring);
        assert_eq!(m.tag, "phrase");
        assert_eq!(m.source, MatchSource::Category);
        assert_eq!(m.score, 9);
    }

    #[test]
    fn test_tie_keeps_first_rule() {
        let kb = table(vec![category("first", &["wifi"]), category("second", &["wifi"])]);
        let m = match_input("wifi", &kb, &ScoringConfig::default());
        assert_eq!(m.tag, "first");
    }

    #[test]
    fn test_fallbacks_then_generic() {
        let kb = load_builtin().unwrap();
        let scoring = ScoringConfig::default();

        let m = match_input("The modem lights are orange", &kb, &scoring);
        assert_eq!(m.source, MatchSource::Fallback);
        assert_eq!(m.tag, "router_issues");

        let m = match_input("login page rejects me", &kb, &scoring);
        assert_eq!(m.source, MatchSource::Fallback);
        assert_eq!(m.tag, "account_access");

        let m = match_input("printer offline", &kb, &scoring);
        assert_eq!(m.source, MatchSource::Generic);
        assert_eq!(m.tag, "general_connectivity");
        assert!(m.steps[0].contains("printer offline"));
    }

    #[test]
    fn test_password_reaches_authentication_before_fallback() {
        let kb = load_builtin().unwrap();
        let scoring = ScoringConfig::default();

        // "password" is also a trigger, so the category always outscores the fallback
        let m = match_input("forgot my email password", &kb, &scoring);
        assert_eq!(m.source, MatchSource::Category);
        assert_eq!(m.tag, "authentication");

        let m = match_input("login page rejects me", &kb, &scoring);
        assert_eq!(m.tag, "account_access");
    }

    #[test]
    fn test_builtin_keyword_ranking() {
        let kb = load_builtin().unwrap();
        let m = match_input("Video call on zoom keeps freezing", &kb, &ScoringConfig::default());
        assert_eq!(m.tag, "video_call_issues");

        let m = match_input("high ping and lag spikes in every match", &kb, &ScoringConfig::default());
        assert_eq!(m.tag, "gaming_lag");
    }
}
