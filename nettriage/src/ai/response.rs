//! Defensive parsing of completion-service replies.
//!
//! The service is asked for JSON but nothing guarantees the shape. Every
//! field is coerced on its own: a missing or wrong-typed field becomes its
//! empty/default value instead of failing the whole reply.

use serde_json::Value;

use crate::analyzer::Diagnosis;

/// Used when the reply carries no numeric confidence
pub const DEFAULT_CONFIDENCE: u8 = 75;
pub const MAX_FOLLOW_UPS: usize = 3;

pub fn coerce_diagnosis(value: &Value) -> Diagnosis {
    let reasoning = non_empty_str(value.get("reasoning"))
        .or_else(|| non_empty_str(value.get("explanation")));

    let mut follow_up_questions = string_list(value.get("followUpQuestions"));
    follow_up_questions.truncate(MAX_FOLLOW_UPS);

    Diagnosis {
        solutions: string_list(value.get("solutions")),
        confidence: confidence(value.get("confidence")),
        detected_issues: string_list(value.get("detectedIssues")),
        follow_up_questions,
        reasoning,
    }
}

fn string_list(field: Option<&Value>) -> Vec<String> {
    match field.and_then(Value::as_array) {
        Some(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    }
}

fn non_empty_str(field: Option<&Value>) -> Option<String> {
    field
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn confidence(field: Option<&Value>) -> u8 {
    match field.and_then(Value::as_f64) {
        Some(n) if n.is_finite() => n.round().clamp(0.0, 100.0) as u8,
        _ => DEFAULT_CONFIDENCE,
    }
}

/// Pull the JSON object out of a model reply that may wrap it in prose or
/// a markdown code fence.
pub fn extract_json_from_text(text: &str) -> String {
    let text = text.trim();

    if let Some(start) = text.find("```json") {
        if let Some(end) = text.rfind("```") {
            if end > start + 7 {
                return text[start + 7..end].trim().to_string();
            }
        }
    }

    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if end > start {
            return text[start..=end].to_string();
        }
    }

    text.to_string()
}
