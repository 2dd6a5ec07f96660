//! JSONL audit trail logging.
//!
//! Every state-changing command appends events to an audit.jsonl file,
//! one JSON object per line. The trail is the record of what changed a
//! portfolio and when; read-only commands are not logged.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use folio::{Position, RebalanceResult, SharedPortfolio};
use serde::Serialize;

use crate::error::Result;

/// An audit event written to the JSONL trail.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub event: &'static str,
    pub ts: DateTime<Utc>,
    #[serde(flatten)]
    pub data: serde_json::Value,
}

/// Append-only audit logger.
pub struct AuditLog {
    writer: BufWriter<std::fs::File>,
}

impl AuditLog {
    /// Open (or create) the audit log file for appending.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// Log an event with arbitrary JSON data.
    pub fn log(&mut self, event: &'static str, data: serde_json::Value) -> Result<()> {
        let entry = AuditEvent {
            event,
            ts: Utc::now(),
            data,
        };
        let json = serde_json::to_string(&entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writeln!(self.writer, "{json}")?;
        self.writer.flush()?;
        Ok(())
    }

    /// Log a simple event with no additional data.
    pub fn log_simple(&mut self, event: &'static str) -> Result<()> {
        self.log(event, serde_json::json!({}))
    }
}

/// Convenience: log a position added.
pub fn log_position_added(audit: &mut AuditLog, position: &Position) -> Result<()> {
    audit.log(
        "position_added",
        serde_json::json!({
            "id": position.id.to_string(),
            "symbol": position.symbol.as_str(),
            "shares": position.shares,
            "cost_price": position.cost_price,
            "target_allocation": position.target_allocation,
        }),
    )
}

/// Convenience: log a position removed.
pub fn log_position_removed(audit: &mut AuditLog, position: &Position) -> Result<()> {
    audit.log(
        "position_removed",
        serde_json::json!({
            "id": position.id.to_string(),
            "symbol": position.symbol.as_str(),
            "shares": position.shares,
        }),
    )
}

/// Convenience: log a price refresh.
pub fn log_prices_refreshed(
    audit: &mut AuditLog,
    updated: usize,
    failed: &[String],
) -> Result<()> {
    audit.log(
        "prices_refreshed",
        serde_json::json!({
            "updated": updated,
            "failed": failed,
        }),
    )
}

/// Convenience: log a computed rebalance proposal.
pub fn log_rebalance_proposed(audit: &mut AuditLog, results: &[RebalanceResult]) -> Result<()> {
    let trades: Vec<_> = results
        .iter()
        .map(|r| {
            serde_json::json!({
                "symbol": r.symbol.as_str(),
                "share_change": r.share_change,
                "new_shares": r.new_shares,
                "avg_cost": r.avg_cost,
                "target": r.new_allocation,
            })
        })
        .collect();

    audit.log("rebalance_proposed", serde_json::json!({ "trades": trades }))
}

/// Convenience: log an applied rebalance.
pub fn log_rebalance_applied(audit: &mut AuditLog, results: &[RebalanceResult]) -> Result<()> {
    audit.log(
        "rebalance_applied",
        serde_json::json!({ "trade_count": results.len() }),
    )
}

/// Convenience: log a share link created.
pub fn log_share_created(audit: &mut AuditLog, shared: &SharedPortfolio) -> Result<()> {
    audit.log(
        "share_created",
        serde_json::json!({
            "share_id": shared.share_id.as_str(),
            "name": shared.name,
            "expires_at": shared.expires_at,
            "positions": shared.positions.len(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audit_log_writes_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_audit.jsonl");

        {
            let mut log = AuditLog::open(&path).unwrap();
            log.log_simple("test_event").unwrap();
            log.log("test_data", serde_json::json!({"key": "value"}))
                .unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        for line in &lines {
            let _: serde_json::Value = serde_json::from_str(line).unwrap();
        }

        assert!(lines[0].contains("\"event\":\"test_event\""));
    }

    #[test]
    fn audit_log_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subdir").join("deep").join("audit.jsonl");

        let mut log = AuditLog::open(&path).unwrap();
        log.log_simple("test").unwrap();

        assert!(path.exists());
    }

    #[test]
    fn position_events_carry_identity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");

        let pos = Position::new(
            folio::PositionId(7),
            folio::Symbol::new("AAPL"),
            10.0,
            100.0,
            150.0,
            50.0,
        );

        {
            let mut log = AuditLog::open(&path).unwrap();
            log_position_added(&mut log, &pos).unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("\"symbol\":\"AAPL\""));
        assert!(contents.contains("\"id\":\"P7\""));
    }
}
