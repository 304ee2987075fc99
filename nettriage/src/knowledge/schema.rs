//! Knowledge Base Schema
//!
//! Data structures for the curated troubleshooting tables: issue categories
//! with their trigger phrases and remediation steps, device archetypes,
//! symptom severities and canned follow-up questions. A `KnowledgeBase` is
//! built once and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Placeholder replaced with the user's own words in the generic steps.
pub const PROBLEM_PLACEHOLDER: &str = "{problem}";

#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("Failed to read knowledge file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse knowledge JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid knowledge base: {0}")]
    Invalid(String),
}

/// Coarse classification of the device that reported the problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Mobile,
    Computer,
    SmartTv,
    GamingConsole,
    Tablet,
    #[default]
    Unknown,
}

impl DeviceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceKind::Mobile => "mobile",
            DeviceKind::Computer => "computer",
            DeviceKind::SmartTv => "smart_tv",
            DeviceKind::GamingConsole => "gaming_console",
            DeviceKind::Tablet => "tablet",
            DeviceKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Device-conditional remediation branch of a category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceVariant {
    /// Devices that take the `steps` branch
    pub devices: Vec<DeviceKind>,
    pub steps: Vec<String>,
    /// Steps for every other device
    #[serde(default)]
    pub otherwise: Vec<String>,
}

impl DeviceVariant {
    pub fn select(&self, device: DeviceKind) -> &[String] {
        if self.devices.contains(&device) {
            &self.steps
        } else {
            &self.otherwise
        }
    }
}

/// A named cluster of trigger phrases mapped to an ordered remediation list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryRule {
    /// Issue tag, e.g. `performance`
    pub tag: String,

    #[serde(default)]
    pub description: String,

    /// Detection conditions for the signal extractor. Every group must have
    /// at least one keyword present in the lower-cased input.
    #[serde(default)]
    pub detect: Vec<Vec<String>>,

    /// Phrases scored by the keyword matcher (may be multi-word)
    pub triggers: Vec<String>,

    /// Remediation steps, earliest first
    pub steps: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_variant: Option<DeviceVariant>,
}

impl CategoryRule {
    /// Whether the detection conditions fire on already lower-cased text.
    pub fn detects(&self, lowered: &str) -> bool {
        !self.detect.is_empty()
            && self
                .detect
                .iter()
                .all(|group| group.iter().any(|keyword| lowered.contains(keyword.as_str())))
    }

    /// Base steps followed by the device branch, if the category has one.
    pub fn steps_for(&self, device: DeviceKind) -> impl Iterator<Item = &String> + '_ {
        let variant: &[String] = match &self.device_variant {
            Some(variant) => variant.select(device),
            None => &[],
        };
        self.steps.iter().chain(variant.iter())
    }
}

/// Hand-picked rule used when no category scores at all
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FallbackRule {
    pub tag: String,
    pub keywords: Vec<String>,
    pub steps: Vec<String>,
}

impl FallbackRule {
    pub fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(k.as_str()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceProfile {
    pub device: DeviceKind,
    pub keywords: Vec<String>,
    /// Informational only; not consulted by matching
    #[serde(default)]
    pub capabilities: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SymptomLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for SymptomLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SymptomLevel::Low => "low",
            SymptomLevel::Medium => "medium",
            SymptomLevel::High => "high",
            SymptomLevel::Critical => "critical",
        };
        f.pad(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SymptomSeverity {
    pub symptom: String,
    pub severity: SymptomLevel,
}

/// Clarifying questions offered when a tag is detected
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FollowUpSet {
    pub tag: String,
    pub questions: Vec<String>,
}

/// Word lists for urgency and emotional-tone cues
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Lexicon {
    #[serde(default)]
    pub urgency_words: Vec<String>,
    #[serde(default)]
    pub emotion_words: Vec<String>,
}

fn default_tag() -> String {
    "general_connectivity".to_string()
}

/// The complete, immutable rule table consulted by every classification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KnowledgeBase {
    /// Categories in priority order; ties in scoring keep the earlier one
    pub categories: Vec<CategoryRule>,

    #[serde(default)]
    pub fallbacks: Vec<FallbackRule>,

    /// Diagnostic sequence for inputs no category covers
    pub generic_steps: Vec<String>,

    /// Tag reported when no category fires
    #[serde(default = "default_tag")]
    pub default_tag: String,

    /// Checked in order, first match wins
    #[serde(default)]
    pub devices: Vec<DeviceProfile>,

    #[serde(default)]
    pub symptoms: Vec<SymptomSeverity>,

    /// Follow-up sets in priority order
    #[serde(default)]
    pub follow_ups: Vec<FollowUpSet>,

    #[serde(default)]
    pub lexicon: Lexicon,
}

impl KnowledgeBase {
    pub fn category(&self, tag: &str) -> Option<&CategoryRule> {
        self.categories.iter().find(|c| c.tag == tag)
    }

    /// Generic steps with the raw input echoed into them.
    pub fn generic_fallback(&self, problem: &str) -> Vec<String> {
        self.generic_steps
            .iter()
            .map(|step| step.replace(PROBLEM_PLACEHOLDER, problem.trim()))
            .collect()
    }

    /// Highest severity among the symptoms mentioned in the text.
    pub fn symptom_severity(&self, text: &str) -> Option<SymptomLevel> {
        let lowered = text.to_lowercase();
        self.symptoms
            .iter()
            .filter(|s| lowered.contains(s.symptom.as_str()))
            .map(|s| s.severity)
            .max()
    }

    pub fn validate(&self) -> Result<(), KnowledgeError> {
        if self.categories.is_empty() {
            return Err(KnowledgeError::Invalid("no categories defined".to_string()));
        }
        if self.generic_steps.is_empty() {
            return Err(KnowledgeError::Invalid("generic_steps must not be empty".to_string()));
        }
        if self.default_tag.trim().is_empty() {
            return Err(KnowledgeError::Invalid("default_tag must not be empty".to_string()));
        }

        let mut seen = HashSet::new();
        for category in &self.categories {
            if !seen.insert(category.tag.as_str()) {
                return Err(KnowledgeError::Invalid(format!(
                    "duplicate category tag '{}'",
                    category.tag
                )));
            }
            if category.triggers.is_empty() {
                return Err(KnowledgeError::Invalid(format!(
                    "category '{}' has no triggers",
                    category.tag
                )));
            }
            if category.steps.is_empty() {
                return Err(KnowledgeError::Invalid(format!(
                    "category '{}' has no remediation steps",
                    category.tag
                )));
            }
            if category.detect.is_empty() || category.detect.iter().any(Vec::is_empty) {
                return Err(KnowledgeError::Invalid(format!(
                    "category '{}' needs non-empty detect groups",
                    category.tag
                )));
            }
            ensure_lower_case(
                &format!("category '{}'", category.tag),
                category.triggers.iter().chain(category.detect.iter().flatten()),
            )?;
        }

        for fallback in &self.fallbacks {
            if fallback.keywords.is_empty() || fallback.steps.is_empty() {
                return Err(KnowledgeError::Invalid(format!(
                    "fallback '{}' needs keywords and steps",
                    fallback.tag
                )));
            }
            ensure_lower_case(&format!("fallback '{}'", fallback.tag), fallback.keywords.iter())?;
        }

        for profile in &self.devices {
            ensure_lower_case(&format!("device '{}'", profile.device), profile.keywords.iter())?;
        }
        ensure_lower_case("symptoms", self.symptoms.iter().map(|s| &s.symptom))?;
        ensure_lower_case(
            "lexicon",
            self.lexicon
                .urgency_words
                .iter()
                .chain(self.lexicon.emotion_words.iter()),
        )?;

        Ok(())
    }
}

/// Matching runs on lower-cased text, so upper-case keywords could never fire.
fn ensure_lower_case<'a>(
    owner: &str,
    mut keywords: impl Iterator<Item = &'a String>,
) -> Result<(), KnowledgeError> {
    match keywords.find(|k| k.chars().any(char::is_uppercase)) {
        Some(keyword) => Err(KnowledgeError::Invalid(format!(
            "{} has keyword '{}' that is not lower-case",
            owner, keyword
        ))),
        None => Ok(()),
    }
}
