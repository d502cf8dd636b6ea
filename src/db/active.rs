//! Active policy row. At most one exists; writing it always supersedes the previous one.

use anyhow::{anyhow, Result};
use rusqlite::{params, OptionalExtension};

use super::{history::insert_entry, unix_timestamp, ActivePolicy, Database};
use crate::core::{PolicyState, Ruleset};

impl Database {
    /// Replace the active policy and journal the transition in one transaction.
    pub fn replace_active(&self, ruleset: &Ruleset, detail: &str) -> Result<()> {
        let json = serde_json::to_string(ruleset)?;
        let now = unix_timestamp();

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT OR REPLACE INTO active_policy (id, state, ruleset, applied_at)
             VALUES (1, ?1, ?2, ?3)",
            params![ruleset.state.as_str(), json, now],
        )?;
        insert_entry(&tx, now, ruleset.state.as_str(), true, detail)?;
        tx.commit()?;
        Ok(())
    }

    /// Remove the active policy. Returns whether one was active.
    pub fn clear_active(&self) -> Result<bool> {
        let now = unix_timestamp();

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let removed = tx.execute("DELETE FROM active_policy WHERE id = 1", [])?;
        let detail = if removed > 0 {
            "cleared active policy"
        } else {
            "no active policy"
        };
        insert_entry(&tx, now, "reset", true, detail)?;
        tx.commit()?;
        Ok(removed > 0)
    }

    /// The currently recorded policy, if any.
    pub fn active(&self) -> Result<Option<ActivePolicy>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT state, ruleset, applied_at FROM active_policy WHERE id = 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                },
            )
            .optional()?;

        let Some((state, json, applied_at)) = row else {
            return Ok(None);
        };

        let ruleset: Ruleset = serde_json::from_str(&json)?;
        if PolicyState::parse(&state) != Some(ruleset.state) {
            return Err(anyhow!(
                "active policy row is inconsistent: state column '{state}' vs ruleset '{}'",
                ruleset.state
            ));
        }

        Ok(Some(ActivePolicy {
            ruleset,
            applied_at,
        }))
    }
}
