/// Audit log: records every profile mutation attempt and creator login.
///
/// Each event is stored in SQLite in the `audit_events` table with the
/// session, actor, action kind, outcome and timestamp. Refused and invalid
/// attempts are recorded too; `applied` tells them apart.
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: Uuid,
    pub session_id: String,
    pub actor: String,
    /// `update`, `add_item`, `remove_item`, `login`, ...
    pub action: String,
    pub applied: bool,
    pub outcome: String,
    pub detail: serde_json::Value,
    pub timestamp: i64,
}

pub struct AuditLog {
    conn: Mutex<Connection>,
}

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS audit_events (
        id         TEXT PRIMARY KEY,
        session_id TEXT NOT NULL,
        actor      TEXT NOT NULL,
        action     TEXT NOT NULL,
        applied    INTEGER NOT NULL,
        outcome    TEXT NOT NULL,
        detail     TEXT NOT NULL,
        timestamp  INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_audit_ts ON audit_events(timestamp);";

impl AuditLog {
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open audit database at {path}"))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;
        info!(path = %path, "Audit log opened");
        Ok(Self { conn: Mutex::new(conn) })
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory SQLite")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    pub async fn record(&self, event: AuditEvent) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO audit_events (id, session_id, actor, action, applied, outcome, detail, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                event.id.to_string(),
                event.session_id,
                event.actor,
                event.action,
                event.applied as i32,
                event.outcome,
                serde_json::to_string(&event.detail)?,
                event.timestamp,
            ],
        )?;
        info!("[Audit] {} {} (applied: {})", event.actor, event.action, event.applied);
        Ok(())
    }

    /// Most recent events first.
    pub async fn recent(&self, limit: usize) -> Result<Vec<AuditEvent>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, session_id, actor, action, applied, outcome, detail, timestamp
             FROM audit_events ORDER BY timestamp DESC, rowid DESC LIMIT ?1",
        )?;

        struct Row {
            id_str: String,
            session_id: String,
            actor: String,
            action: String,
            applied_i: i32,
            outcome: String,
            detail_str: String,
            timestamp: i64,
        }

        let events: Vec<AuditEvent> = stmt
            .query_map(params![limit as i64], |row| {
                Ok(Row {
                    id_str: row.get(0)?,
                    session_id: row.get(1)?,
                    actor: row.get(2)?,
                    action: row.get(3)?,
                    applied_i: row.get(4)?,
                    outcome: row.get(5)?,
                    detail_str: row.get(6)?,
                    timestamp: row.get(7)?,
                })
            })?
            .filter_map(|r| r.ok())
            .filter_map(|r| {
                let id = Uuid::parse_str(&r.id_str).ok()?;
                let detail = serde_json::from_str(&r.detail_str).ok()?;
                Some(AuditEvent {
                    id,
                    session_id: r.session_id,
                    actor: r.actor,
                    action: r.action,
                    applied: r.applied_i != 0,
                    outcome: r.outcome,
                    detail,
                    timestamp: r.timestamp,
                })
            })
            .collect();

        Ok(events)
    }
}

/// Helper to create a new audit event with the current timestamp.
pub fn new_event(session_id: &str, actor: &str, action: &str) -> AuditEvent {
    AuditEvent {
        id: Uuid::new_v4(),
        session_id: session_id.to_string(),
        actor: actor.to_string(),
        action: action.to_string(),
        applied: false,
        outcome: String::new(),
        detail: serde_json::json!({}),
        timestamp: Utc::now().timestamp(),
    }
}
