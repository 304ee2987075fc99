//! Troubleshooting history.
//!
//! Every successful diagnosis can be recorded as a (problem, solutions,
//! timestamp) entry and listed back most-recent-first. Persistence is
//! best-effort from the caller's point of view: see [`BestEffortHistory`].

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Lock error: {0}")]
    Lock(String),
}

pub type Result<T> = std::result::Result<T, HistoryError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub problem: String,
    pub solutions: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(problem: impl Into<String>, solutions: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            problem: problem.into(),
            solutions,
            timestamp: Utc::now(),
        }
    }
}

pub trait HistoryStore: Send + Sync {
    fn save(&self, entry: &HistoryEntry) -> Result<()>;

    /// Newest first, at most `limit` entries
    fn load_recent(&self, limit: usize) -> Result<Vec<HistoryEntry>>;
}

impl<T: HistoryStore + ?Sized> HistoryStore for Box<T> {
    fn save(&self, entry: &HistoryEntry) -> Result<()> {
        (**self).save(entry)
    }

    fn load_recent(&self, limit: usize) -> Result<Vec<HistoryEntry>> {
        (**self).load_recent(limit)
    }
}

pub struct SqliteHistory {
    conn: Mutex<Connection>,
}

impl SqliteHistory {
    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = SqliteHistory {
            conn: Mutex::new(conn),
        };
        store.initialize()?;
        tracing::debug!("Opened history database at {:?}", path);
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let store = SqliteHistory {
            conn: Mutex::new(Connection::open_in_memory()?),
        };
        store.initialize()?;
        Ok(store)
    }

    fn get_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| HistoryError::Lock(e.to_string()))
    }

    pub fn initialize(&self) -> Result<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS troubleshooting (
                id TEXT PRIMARY KEY,
                problem TEXT NOT NULL,
                solutions_json TEXT NOT NULL,
                timestamp TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_troubleshooting_timestamp ON troubleshooting(timestamp)",
            [],
        )?;

        Ok(())
    }

    pub fn count(&self) -> Result<usize> {
        let conn = self.get_conn()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM troubleshooting", [], |row| row.get(0))?;
        Ok(n as usize)
    }
}

impl HistoryStore for SqliteHistory {
    fn save(&self, entry: &HistoryEntry) -> Result<()> {
        let solutions_json = serde_json::to_string(&entry.solutions)
            .map_err(|e| HistoryError::Serialization(e.to_string()))?;
        // fixed-width UTC form so text ordering matches time ordering
        let timestamp = entry.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true);

        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO troubleshooting (id, problem, solutions_json, timestamp)
             VALUES (?1, ?2, ?3, ?4)",
            params![entry.id, entry.problem, solutions_json, timestamp],
        )?;
        tracing::info!(id = %entry.id, "Saved troubleshooting entry");
        Ok(())
    }

    fn load_recent(&self, limit: usize) -> Result<Vec<HistoryEntry>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, problem, solutions_json, timestamp FROM troubleshooting
             ORDER BY timestamp DESC, rowid DESC",
        )?;
        let mut rows = stmt.query([])?;

        let mut entries = Vec::new();
        while entries.len() < limit {
            let row = match rows.next()? {
                Some(row) => row,
                None => break,
            };
            let id: String = row.get(0)?;
            let problem: String = row.get(1)?;
            let solutions_json: String = row.get(2)?;
            let timestamp: String = row.get(3)?;
            match decode_entry(id.clone(), problem, &solutions_json, &timestamp) {
                Ok(entry) => entries.push(entry),
                Err(e) => tracing::warn!(id = %id, "Skipping unreadable history row: {}", e),
            }
        }
        Ok(entries)
    }
}

fn decode_entry(
    id: String,
    problem: String,
    solutions_json: &str,
    timestamp: &str,
) -> Result<HistoryEntry> {
    let solutions: Vec<String> = serde_json::from_str(solutions_json)
        .map_err(|e| HistoryError::Serialization(e.to_string()))?;
    let timestamp = DateTime::parse_from_rfc3339(timestamp)
        .map_err(|e| HistoryError::Serialization(e.to_string()))?
        .with_timezone(&Utc);
    Ok(HistoryEntry {
        id,
        problem,
        solutions,
        timestamp,
    })
}

/// Process-local store, used by tests and when no database is configured.
#[derive(Default)]
pub struct MemoryHistory {
    entries: Mutex<Vec<HistoryEntry>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for MemoryHistory {
    fn save(&self, entry: &HistoryEntry) -> Result<()> {
        self.entries
            .lock()
            .map_err(|e| HistoryError::Lock(e.to_string()))?
            .push(entry.clone());
        Ok(())
    }

    fn load_recent(&self, limit: usize) -> Result<Vec<HistoryEntry>> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| HistoryError::Lock(e.to_string()))?;
        // newest insert first among equal timestamps
        let mut recent: Vec<HistoryEntry> = entries.iter().rev().cloned().collect();
        recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        recent.truncate(limit);
        Ok(recent)
    }
}

/// Wraps a store so that failures are logged and swallowed. A diagnosis is
/// never lost because persistence failed.
pub struct BestEffortHistory<S: HistoryStore> {
    inner: S,
}

impl<S: HistoryStore> BestEffortHistory<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Returns the saved entry, or `None` when the write failed.
    pub fn record(&self, problem: &str, solutions: &[String]) -> Option<HistoryEntry> {
        let entry = HistoryEntry::new(problem, solutions.to_vec());
        match self.inner.save(&entry) {
            Ok(()) => Some(entry),
            Err(e) => {
                tracing::warn!("Failed to save troubleshooting entry: {}", e);
                None
            }
        }
    }

    /// Empty on failure
    pub fn recent(&self, limit: usize) -> Vec<HistoryEntry> {
        self.inner.load_recent(limit).unwrap_or_else(|e| {
            tracing::warn!("Failed to load troubleshooting history: {}", e);
            Vec::new()
        })
    }
}
