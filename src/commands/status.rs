//! Active policy and journal reporting.

use anyhow::Result;

use crate::config::{MSG_NO_HISTORY, MSG_NO_POLICY};
use crate::db::{ActivePolicy, Database, HistoryEntry};

use super::MessageSink;

/// Report the active policy through the sink.
pub fn show_status(db: &Database, sink: &MessageSink, json: bool) -> Result<()> {
    let active = db.active()?;
    let text = render_status(active.as_ref(), json)?;
    sink(text.as_str());
    Ok(())
}

/// Report the newest `limit` journal entries through the sink.
pub fn show_history(db: &Database, sink: &MessageSink, limit: usize, json: bool) -> Result<()> {
    let entries = db.recent_history(limit)?;
    let text = render_history(&entries, json)?;
    sink(text.as_str());
    Ok(())
}

pub fn render_status(active: Option<&ActivePolicy>, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(&active)?);
    }

    let Some(active) = active else {
        return Ok(MSG_NO_POLICY.to_string());
    };

    let mut out = format!(
        "Active policy: {} (applied at {})",
        active.ruleset.state, active.applied_at
    );
    for (i, rule) in active.ruleset.rules.iter().enumerate() {
        out.push_str(&format!("\n  {:>2}. {rule}", i + 1));
    }
    Ok(out)
}

pub fn render_history(entries: &[HistoryEntry], json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(entries)?);
    }

    if entries.is_empty() {
        return Ok(MSG_NO_HISTORY.to_string());
    }

    let lines: Vec<String> = entries
        .iter()
        .map(|e| {
            format!(
                "{}  {:<10}  {:<6}  {}",
                e.timestamp,
                e.operation,
                if e.success { "ok" } else { "FAILED" },
                e.detail
            )
        })
        .collect();
    Ok(lines.join("\n"))
}
