//! Solution Composer
//!
//! Turns detected issue tags plus the device archetype into a short,
//! priority-ordered list of remediation steps.

use std::collections::HashSet;

use crate::knowledge::{DeviceKind, KnowledgeBase};

pub fn compose(
    issue_tags: &[String],
    device: DeviceKind,
    raw_input: &str,
    kb: &KnowledgeBase,
    max_solutions: usize,
) -> Vec<String> {
    let mut steps: Vec<String> = Vec::new();
    for tag in issue_tags {
        match kb.category(tag) {
            Some(category) => steps.extend(category.steps_for(device).cloned()),
            None => steps.extend(kb.generic_fallback(raw_input)),
        }
    }
    finalize_steps(steps, max_solutions)
}

/// Drop repeats (first occurrence wins) and cap the list.
pub fn finalize_steps(steps: Vec<String>, max_solutions: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    steps
        .into_iter()
        .filter(|step| seen.insert(step.clone()))
        .take(max_solutions)
        .collect()
}
