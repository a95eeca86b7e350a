//! SQLite-backed store for interviews and messages.
//!
//! Blocking rusqlite calls run inside `tokio::task::spawn_blocking`, opening
//! a connection per operation against a shared database path. Timestamps are
//! stored as RFC 3339 text; message reads order by `created_at, rowid` so the
//! order is stable when timestamps collide.

use crate::models::{Interview, InterviewStatus, Message, Speaker};
use crate::subscription::MessageSubscription;
use chrono::{DateTime, Utc};
use proctor_common::{Error, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use tokio::sync::broadcast;

/// Capacity of the insert-notification channel. Lagging receivers skip
/// dropped events rather than stalling writers.
const SUBSCRIPTION_CAPACITY: usize = 256;

/// SQLite persistent store.
pub struct SqliteStore {
    db_path: PathBuf,
    inserts: broadcast::Sender<Message>,
}

impl SqliteStore {
    /// Open (or create) the store at the given database path.
    pub fn new(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path).map_err(store_err)?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS interviews (
                id TEXT PRIMARY KEY,
                role TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'in_progress',
                score INTEGER,
                feedback TEXT,
                created_at TEXT NOT NULL,
                completed_at TEXT
            );

            CREATE TABLE IF NOT EXISTS messages (
                id TEXT PRIMARY KEY,
                interview_id TEXT NOT NULL,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_messages_interview
                ON messages(interview_id, created_at);
            "#,
        )
        .map_err(store_err)?;

        let (inserts, _) = broadcast::channel(SUBSCRIPTION_CAPACITY);

        Ok(Self {
            db_path: db_path.to_path_buf(),
            inserts,
        })
    }

    /// Subscribe to newly inserted messages for one interview.
    ///
    /// Delivery starts at subscription time; events may race the direct
    /// response of the request that produced them, so consumers must
    /// de-duplicate by message id.
    pub fn subscribe(&self, interview_id: &str) -> MessageSubscription {
        MessageSubscription::new(interview_id.to_string(), self.inserts.subscribe())
    }

    /// Create a new in-progress interview for the given role.
    pub async fn create_interview(&self, role: &str) -> Result<Interview> {
        let interview = Interview {
            id: uuid::Uuid::new_v4().to_string(),
            role: role.to_string(),
            status: InterviewStatus::InProgress,
            score: None,
            feedback: None,
            created_at: Utc::now(),
            completed_at: None,
        };

        let db_path = self.db_path.clone();
        let row = interview.clone();
        self.run_blocking(move || {
            let conn = Connection::open(&db_path)?;
            conn.execute(
                "INSERT INTO interviews (id, role, status, score, feedback, created_at, completed_at)
                 VALUES (?1, ?2, ?3, NULL, NULL, ?4, NULL)",
                params![
                    row.id,
                    row.role,
                    row.status.as_str(),
                    row.created_at.to_rfc3339()
                ],
            )?;
            Ok(())
        })
        .await?;

        tracing::debug!(interview_id = %interview.id, role = %interview.role, "Interview created");
        Ok(interview)
    }

    /// Fetch a single interview by id.
    pub async fn get_interview(&self, id: &str) -> Result<Option<Interview>> {
        let db_path = self.db_path.clone();
        let id = id.to_string();
        self.run_blocking(move || {
            let conn = Connection::open(&db_path)?;
            let mut stmt = conn.prepare(
                "SELECT id, role, status, score, feedback, created_at, completed_at
                 FROM interviews WHERE id = ?1",
            )?;
            stmt.query_row(params![id], row_to_interview).optional()
        })
        .await
    }

    /// List completed interviews, newest first.
    pub async fn list_completed_interviews(&self, limit: u32) -> Result<Vec<Interview>> {
        let db_path = self.db_path.clone();
        self.run_blocking(move || {
            let conn = Connection::open(&db_path)?;
            let mut stmt = conn.prepare(
                "SELECT id, role, status, score, feedback, created_at, completed_at
                 FROM interviews WHERE status = 'completed'
                 ORDER BY created_at DESC LIMIT ?1",
            )?;
            let rows = stmt.query_map(params![limit], row_to_interview)?.collect();
            rows
        })
        .await
    }

    /// Finalize an interview: completed status, score, feedback, completion time.
    ///
    /// Returns false when the id does not resolve.
    pub async fn complete_interview(&self, id: &str, score: i64, feedback: &str) -> Result<bool> {
        let db_path = self.db_path.clone();
        let id = id.to_string();
        let feedback = feedback.to_string();
        let completed_at = Utc::now().to_rfc3339();
        let affected = self
            .run_blocking(move || {
                let conn = Connection::open(&db_path)?;
                let affected = conn.execute(
                    "UPDATE interviews
                     SET status = 'completed', score = ?2, feedback = ?3, completed_at = ?4
                     WHERE id = ?1",
                    params![id, score, feedback, completed_at],
                )?;
                Ok(affected)
            })
            .await?;

        Ok(affected > 0)
    }

    /// Append one message turn and notify subscribers.
    pub async fn append_message(
        &self,
        interview_id: &str,
        role: Speaker,
        content: &str,
    ) -> Result<Message> {
        let message = Message {
            id: uuid::Uuid::new_v4().to_string(),
            interview_id: interview_id.to_string(),
            role,
            content: content.to_string(),
            created_at: Utc::now(),
        };

        let db_path = self.db_path.clone();
        let row = message.clone();
        self.run_blocking(move || {
            let conn = Connection::open(&db_path)?;
            conn.execute(
                "INSERT INTO messages (id, interview_id, role, content, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    row.id,
                    row.interview_id,
                    row.role.as_str(),
                    row.content,
                    row.created_at.to_rfc3339()
                ],
            )?;
            Ok(())
        })
        .await?;

        // No receivers is fine; the send result is informational only.
        let _ = self.inserts.send(message.clone());

        tracing::debug!(
            interview_id = %message.interview_id,
            message_id = %message.id,
            role = message.role.as_str(),
            "Message appended"
        );
        Ok(message)
    }

    /// Full ordered message history for an interview.
    pub async fn list_messages(&self, interview_id: &str) -> Result<Vec<Message>> {
        let db_path = self.db_path.clone();
        let interview_id = interview_id.to_string();
        self.run_blocking(move || {
            let conn = Connection::open(&db_path)?;
            let mut stmt = conn.prepare(
                "SELECT id, interview_id, role, content, created_at
                 FROM messages WHERE interview_id = ?1
                 ORDER BY created_at ASC, rowid ASC",
            )?;
            let rows = stmt.query_map(params![interview_id], row_to_message)?.collect();
            rows
        })
        .await
    }

    async fn run_blocking<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce() -> std::result::Result<T, rusqlite::Error> + Send + 'static,
    {
        tokio::task::spawn_blocking(f)
            .await
            .map_err(|e| Error::Internal(format!("store task panicked: {e}")))?
            .map_err(store_err)
    }
}

fn store_err(e: rusqlite::Error) -> Error {
    Error::Store(e.to_string())
}

fn parse_timestamp(raw: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| DateTime::<Utc>::UNIX_EPOCH)
}

fn row_to_interview(row: &Row<'_>) -> std::result::Result<Interview, rusqlite::Error> {
    let status: String = row.get(2)?;
    let created_at: String = row.get(5)?;
    let completed_at: Option<String> = row.get(6)?;
    Ok(Interview {
        id: row.get(0)?,
        role: row.get(1)?,
        status: InterviewStatus::from_str_lossy(&status),
        score: row.get(3)?,
        feedback: row.get(4)?,
        created_at: parse_timestamp(created_at),
        completed_at: completed_at.map(parse_timestamp),
    })
}

fn row_to_message(row: &Row<'_>) -> std::result::Result<Message, rusqlite::Error> {
    let role: String = row.get(2)?;
    let created_at: String = row.get(4)?;
    Ok(Message {
        id: row.get(0)?,
        interview_id: row.get(1)?,
        role: Speaker::from_str_lossy(&role),
        content: row.get(3)?,
        created_at: parse_timestamp(created_at),
    })
}
