//! Troubleshooting Knowledge Base
//!
//! Immutable tables the classifier consults:
//!
//! - **Categories**: issue tag, detection conditions, trigger phrases and
//!   ordered remediation steps (optionally with a device-specific branch)
//! - **Fallbacks**: hand-picked rules for inputs no category scores on
//! - **Devices**: archetypes detected first-match-wins
//! - **Symptoms**: severity levels for common complaints
//! - **Follow-ups**: clarifying questions keyed by tag
//!
//! # Usage
//!
//! ```rust
//! use nettriage::knowledge::load_builtin;
//!
//! let kb = load_builtin().unwrap();
//! assert!(kb.category("performance").is_some());
//! ```

pub mod schema;
pub mod builtin;

pub use schema::*;
pub use builtin::{load_builtin, load_from_file, load_from_str};
