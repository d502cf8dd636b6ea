//! Policy transition journal.

use anyhow::Result;
use rusqlite::{params, Connection};

use super::{unix_timestamp, Database, HistoryEntry};

pub(super) fn insert_entry(
    conn: &Connection,
    timestamp: i64,
    operation: &str,
    success: bool,
    detail: &str,
) -> Result<()> {
    conn.execute(
        "INSERT INTO policy_history (timestamp, operation, success, detail)
         VALUES (?1, ?2, ?3, ?4)",
        params![timestamp, operation, success as i32, detail],
    )?;
    Ok(())
}

impl Database {
    /// Journal a transition the engine refused or could not record.
    pub fn record_failure(&self, operation: &str, detail: &str) -> Result<()> {
        let conn = self.lock()?;
        insert_entry(&conn, unix_timestamp(), operation, false, detail)
    }

    /// Most recent journal entries, newest first.
    pub fn recent_history(&self, limit: usize) -> Result<Vec<HistoryEntry>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(
            "SELECT timestamp, operation, success, detail
             FROM policy_history
             ORDER BY id DESC
             LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(HistoryEntry {
                timestamp: row.get(0)?,
                operation: row.get(1)?,
                success: row.get::<_, i32>(2)? != 0,
                detail: row.get(3)?,
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    /// Delete journal entries older than the specified number of days.
    pub fn prune_history(&self, max_age_days: u64) -> Result<usize> {
        let cutoff = unix_timestamp() - (max_age_days * 86400) as i64;
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM policy_history WHERE timestamp < ?1",
            params![cutoff],
        )?;
        if deleted > 0 {
            tracing::info!("Pruned {deleted} policy history entries older than {max_age_days} days");
        }
        Ok(deleted)
    }
}
