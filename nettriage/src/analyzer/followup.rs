//! Follow-up Generator
//!
//! Canned clarifying questions for the tags that have them, in the
//! knowledge base's priority order rather than detection order.

use crate::knowledge::KnowledgeBase;

pub fn follow_ups(issue_tags: &[String], kb: &KnowledgeBase, max_follow_ups: usize) -> Vec<String> {
    kb.follow_ups
        .iter()
        .filter(|set| issue_tags.iter().any(|t| *t == set.tag))
        .flat_map(|set| set.questions.iter().cloned())
        .take(max_follow_ups)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::load_builtin;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_priority_order_not_detection_order() {
        let kb = load_builtin().unwrap();
        let questions = follow_ups(&tags(&["streaming_issues", "performance"]), &kb, 2);
        assert_eq!(questions.len(), 2);
        assert!(questions[0].contains("speed test"));
        assert!(questions[1].contains("every device"));
    }

    #[test]
    fn test_tags_without_questions() {
        let kb = load_builtin().unwrap();
        assert!(follow_ups(&tags(&["gaming_lag", "general_connectivity"]), &kb, 2).is_empty());
    }

    #[test]
    fn test_truncated_to_limit() {
        let kb = load_builtin().unwrap();
        let all = tags(&["performance", "connection_failure", "streaming_issues"]);
        assert_eq!(follow_ups(&all, &kb, 2).len(), 2);
        assert_eq!(follow_ups(&all, &kb, 10).len(), 6);
    }
}
