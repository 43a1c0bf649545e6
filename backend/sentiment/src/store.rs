/// SQLite persistence for sentiment records and conversation summaries.
///
/// Both tables are append-only.
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use rusqlite::{params, Connection, Row};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use ambassador_core::SentimentLabel;

use crate::aggregator::{ConversationSummary, SentimentRecord, SentimentSummary};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS sentiment_records (
         id              TEXT PRIMARY KEY,
         timestamp       INTEGER NOT NULL,
         author          TEXT NOT NULL,
         conversation_id TEXT NOT NULL,
         text            TEXT NOT NULL,
         label           TEXT NOT NULL,
         score           REAL NOT NULL
     );
     CREATE INDEX IF NOT EXISTS idx_sentiment_ts ON sentiment_records(timestamp);
     CREATE INDEX IF NOT EXISTS idx_sentiment_conv ON sentiment_records(conversation_id);
     CREATE TABLE IF NOT EXISTS conversation_summaries (
         conversation_id TEXT NOT NULL,
         author          TEXT NOT NULL,
         closed_at       INTEGER NOT NULL,
         summary         TEXT NOT NULL
     );";

const RECORD_COLUMNS: &str = "id, timestamp, author, conversation_id, text, label, score";

pub struct SentimentStore {
    conn: Mutex<Connection>,
}

impl SentimentStore {
    /// Create or open a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref()).context("Failed to open sentiment database")?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)
            .context("Failed to initialize sentiment schema")?;
        info!("Sentiment store opened at {:?}", path.as_ref());
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Open an in-memory database (for tests).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    pub async fn insert(&self, record: &SentimentRecord) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO sentiment_records (id, timestamp, author, conversation_id, text, label, score)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.id.to_string(),
                record.timestamp.timestamp_millis(),
                record.author,
                record.conversation_id,
                record.text,
                record.label.as_str(),
                record.score,
            ],
        )?;
        debug!("Stored sentiment record {}", record.id);
        Ok(())
    }

    /// All records, oldest first.
    pub async fn all(&self) -> Result<Vec<SentimentRecord>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM sentiment_records ORDER BY timestamp ASC, rowid ASC"
        ))?;
        let rows = stmt
            .query_map([], row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub async fn for_conversation(&self, conversation_id: &str) -> Result<Vec<SentimentRecord>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM sentiment_records
             WHERE conversation_id = ?1 ORDER BY timestamp ASC, rowid ASC"
        ))?;
        let rows = stmt
            .query_map(params![conversation_id], row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub async fn insert_summary(&self, summary: &ConversationSummary) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO conversation_summaries (conversation_id, author, closed_at, summary)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                summary.conversation_id,
                summary.author,
                summary.closed_at.timestamp_millis(),
                serde_json::to_string(&summary.summary)?,
            ],
        )?;
        Ok(())
    }

    /// Stored conversation summaries, oldest first.
    pub async fn summaries(&self) -> Result<Vec<ConversationSummary>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT conversation_id, author, closed_at, summary
             FROM conversation_summaries ORDER BY closed_at ASC, rowid ASC",
        )?;
        let raw = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        raw.into_iter()
            .map(|(conversation_id, author, closed_at, summary)| {
                let summary: SentimentSummary =
                    serde_json::from_str(&summary).context("Corrupt conversation summary")?;
                Ok(ConversationSummary {
                    conversation_id,
                    author,
                    closed_at: Utc.timestamp_millis_opt(closed_at).single().unwrap_or_default(),
                    summary,
                })
            })
            .collect()
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<SentimentRecord> {
    let id: String = row.get(0)?;
    let millis: i64 = row.get(1)?;
    let label: String = row.get(5)?;
    Ok(SentimentRecord {
        id: Uuid::parse_str(&id).unwrap_or_default(),
        timestamp: Utc.timestamp_millis_opt(millis).single().unwrap_or_default(),
        author: row.get(2)?,
        conversation_id: row.get(3)?,
        text: row.get(4)?,
        label: label.parse().unwrap_or(SentimentLabel::Neutral),
        score: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(conv: &str, label: SentimentLabel, offset_secs: i64) -> SentimentRecord {
        SentimentRecord {
            id: Uuid::new_v4(),
            timestamp: Utc::now() + Duration::seconds(offset_secs),
            author: "guest".into(),
            conversation_id: conv.into(),
            text: "hello".into(),
            label,
            score: 0.5,
        }
    }

    #[tokio::test]
    async fn insert_and_read_back_in_order() {
        let store = SentimentStore::in_memory().unwrap();
        store.insert(&record("c1", SentimentLabel::Negative, 10)).await.unwrap();
        store.insert(&record("c1", SentimentLabel::Positive, 0)).await.unwrap();
        store.insert(&record("c2", SentimentLabel::Neutral, 5)).await.unwrap();

        let all = store.all().await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].label, SentimentLabel::Positive);

        let c1 = store.for_conversation("c1").await.unwrap();
        assert_eq!(c1.len(), 2);
        assert!(c1.iter().all(|r| r.conversation_id == "c1"));
    }

    #[tokio::test]
    async fn file_backed_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sentiment.db");
        {
            let store = SentimentStore::open(&path).unwrap();
            store.insert(&record("c1", SentimentLabel::Neutral, 0)).await.unwrap();
        }
        let reopened = SentimentStore::open(&path).unwrap();
        assert_eq!(reopened.all().await.unwrap().len(), 1);
    }
}
