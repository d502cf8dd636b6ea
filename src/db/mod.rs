//! SQLite persistence for the recording filtering engine.
//!
//! Uses `rusqlite` with bundled SQLite. Handles:
//! - The single active policy (ruleset as JSON)
//! - A journal of every requested transition
//! - Pruning of journal entries past the retention window

mod active;
mod history;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Context, Result};
use rusqlite::Connection;
use serde::Serialize;

use crate::core::Ruleset;

/// Manages the SQLite policy store.
pub struct Database {
    conn: Mutex<Connection>,
}

/// The policy currently recorded as installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivePolicy {
    pub ruleset: Ruleset,
    pub applied_at: i64,
}

/// One journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub timestamp: i64,
    pub operation: String,
    pub success: bool,
    pub detail: String,
}

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS active_policy (
        id INTEGER PRIMARY KEY CHECK (id = 1),
        state TEXT NOT NULL,
        ruleset TEXT NOT NULL,
        applied_at INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS policy_history (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp INTEGER NOT NULL,
        operation TEXT NOT NULL,
        success INTEGER NOT NULL,
        detail TEXT NOT NULL DEFAULT ''
    );
    CREATE INDEX IF NOT EXISTS idx_history_timestamp ON policy_history(timestamp);
";

impl Database {
    /// Open or create the store at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open a private in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("policy store lock poisoned"))
    }
}

/// Open the store at `path`, creating its directory and pruning old journal entries.
pub fn open_store(path: &Path) -> Result<Database> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create state directory {}", parent.display()))?;
    }

    let database = Database::open(path)
        .with_context(|| format!("failed to open policy store {}", path.display()))?;
    tracing::debug!("Policy store opened at {}", path.display());

    if let Err(e) = database.prune_history(crate::config::HISTORY_MAX_AGE_DAYS) {
        tracing::warn!("Failed to prune policy history: {e:#}");
    }

    Ok(database)
}

/// Current Unix timestamp in seconds.
pub fn unix_timestamp() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
