//! Built-in and External Knowledge Tables
//!
//! The default tables are JSON files compiled into the binary. A complete
//! replacement table can be loaded from a user-supplied JSON file without
//! recompiling.

use crate::knowledge::schema::*;
use serde::Deserialize;
use std::path::Path;

const EMBEDDED_CATEGORIES: &str = include_str!("../../knowledge/categories.json");
const EMBEDDED_DEVICES: &str = include_str!("../../knowledge/devices.json");
const EMBEDDED_SYMPTOMS: &str = include_str!("../../knowledge/symptoms.json");
const EMBEDDED_DIALOGUE: &str = include_str!("../../knowledge/dialogue.json");

#[derive(Deserialize)]
struct CategoryTable {
    categories: Vec<CategoryRule>,
    #[serde(default)]
    fallbacks: Vec<FallbackRule>,
    generic_steps: Vec<String>,
    default_tag: String,
}

#[derive(Deserialize)]
struct DialogueTable {
    lexicon: Lexicon,
    follow_ups: Vec<FollowUpSet>,
}

/// Assemble the knowledge base from the embedded JSON tables
pub fn load_builtin() -> Result<KnowledgeBase, KnowledgeError> {
    let table: CategoryTable = serde_json::from_str(EMBEDDED_CATEGORIES)?;
    let devices: Vec<DeviceProfile> = serde_json::from_str(EMBEDDED_DEVICES)?;
    let symptoms: Vec<SymptomSeverity> = serde_json::from_str(EMBEDDED_SYMPTOMS)?;
    let dialogue: DialogueTable = serde_json::from_str(EMBEDDED_DIALOGUE)?;

    let kb = KnowledgeBase {
        categories: table.categories,
        fallbacks: table.fallbacks,
        generic_steps: table.generic_steps,
        default_tag: table.default_tag,
        devices,
        symptoms,
        follow_ups: dialogue.follow_ups,
        lexicon: dialogue.lexicon,
    };
    kb.validate()?;

    tracing::debug!(
        categories = kb.categories.len(),
        devices = kb.devices.len(),
        "Loaded built-in knowledge base"
    );
    Ok(kb)
}

/// Parse and validate a complete knowledge base from JSON text
pub fn load_from_str(json: &str) -> Result<KnowledgeBase, KnowledgeError> {
    let kb: KnowledgeBase = serde_json::from_str(json)?;
    kb.validate()?;
    Ok(kb)
}

/// Load a single knowledge base from a JSON file
pub fn load_from_file(path: &Path) -> Result<KnowledgeBase, KnowledgeError> {
    let content = std::fs::read_to_string(path)?;
    let kb = load_from_str(&content).map_err(|e| {
        tracing::warn!("Rejected knowledge file {:?}: {}", path, e);
        e
    })?;
    tracing::info!(
        "Loaded {} categories from {:?}",
        kb.categories.len(),
        path.file_name()
    );
    Ok(kb)
}
