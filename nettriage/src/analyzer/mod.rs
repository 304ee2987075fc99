//! Classification pipeline
//!
//! ```text
//! raw input ─▶ signals ─▶ matcher / tag selection ─▶ composer
//!                                                      │
//!                          follow-ups ◀─ confidence ◀──┘
//! ```

pub mod signals;
pub mod matcher;
pub mod composer;
pub mod confidence;
pub mod followup;
pub mod engine;

// Re-export for convenience
pub use engine::*;
pub use signals::{extract_signals, SignalSet};
pub use matcher::{match_input, MatchSource, PhraseMatch};
