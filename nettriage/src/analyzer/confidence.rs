//! Confidence Estimator
//!
//! Additive heuristic, not a calibrated probability. Starts from the base,
//! adds bonuses for specific descriptions and saturates at the cap.

use crate::analyzer::signals::SignalSet;
use crate::config::ScoringConfig;

pub fn estimate(signals: &SignalSet, issue_tags: &[String], scoring: &ScoringConfig) -> u8 {
    let mut score = scoring.confidence_base;

    if issue_tags.len() == 1 {
        score = score.saturating_add(scoring.single_issue_bonus);
    }
    if signals.has_numbers {
        score = score.saturating_add(scoring.numeric_bonus);
    }
    if signals.token_count > scoring.detail_threshold {
        score = score.saturating_add(scoring.detail_bonus);
    }
    if issue_tags
        .iter()
        .any(|t| scoring.common_issue_tags.iter().any(|c| c == t))
    {
        score = score.saturating_add(scoring.common_issue_bonus);
    }

    score.min(scoring.confidence_cap).min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::DeviceKind;

    fn signals(token_count: usize, has_numbers: bool) -> SignalSet {
        SignalSet {
            tokens: vec!["x".to_string(); token_count],
            issue_tags: vec![],
            device: DeviceKind::Unknown,
            urgent: false,
            emotions: vec![],
            has_numbers,
            token_count,
        }
    }

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_base_only() {
        let scoring = ScoringConfig::default();
        assert_eq!(estimate(&signals(3, false), &tags(&["a", "b"]), &scoring), 70);
    }

    #[test]
    fn test_each_bonus() {
        let scoring = ScoringConfig::default();
        assert_eq!(estimate(&signals(3, false), &tags(&["a"]), &scoring), 85);
        assert_eq!(estimate(&signals(3, true), &tags(&["a", "b"]), &scoring), 80);
        assert_eq!(estimate(&signals(6, false), &tags(&["a", "b"]), &scoring), 80);
        // exactly five tokens is not "more than five"
        assert_eq!(estimate(&signals(5, false), &tags(&["a", "b"]), &scoring), 70);
        assert_eq!(
            estimate(&signals(3, false), &tags(&["gaming_lag", "performance"]), &scoring),
            75
        );
    }

    #[test]
    fn test_saturates_at_cap() {
        let scoring = ScoringConfig::default();
        assert_eq!(estimate(&signals(10, true), &tags(&["performance"]), &scoring), 98);
    }

    #[test]
    fn test_custom_weights() {
        let scoring = ScoringConfig {
            confidence_base: 50,
            single_issue_bonus: 40,
            confidence_cap: 100,
            ..ScoringConfig::default()
        };
        assert_eq!(estimate(&signals(10, true), &tags(&["connection_failure"]), &scoring), 100);
        assert_eq!(estimate(&signals(0, false), &tags(&["a", "b"]), &scoring), 50);
    }

    #[test]
    fn test_extreme_bonuses_saturate() {
        let scoring = ScoringConfig {
            numeric_bonus: u32::MAX,
            detail_bonus: u32::MAX,
            single_issue_bonus: u32::MAX,
            ..ScoringConfig::default()
        };
        assert_eq!(estimate(&signals(10, true), &tags(&["performance"]), &scoring), 98);
        assert_eq!(estimate(&signals(0, false), &tags(&["a", "b"]), &scoring), 70);
    }
}
