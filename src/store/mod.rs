//! SQLite persistence
//!
//! Stores conversation messages and per-turn emotion snapshots. Messages are
//! written once and never updated; load order is insertion order (rowid),
//! which is the conversational order the context projection relies on.

use anyhow::Result;
use chrono::{TimeZone, Utc};
use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use uuid::Uuid;

use crate::context::{ConversationMessage, Role};
use crate::emotion::types::{EmotionSnapshot, VadScore};

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create tables if they do not exist yet.
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS chat_messages (
                id TEXT PRIMARY KEY,
                session_id TEXT NOT NULL,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS emotion_snapshots (
                id TEXT PRIMARY KEY,
                session_id TEXT NOT NULL,
                valence REAL NOT NULL,
                arousal REAL NOT NULL,
                dominance REAL NOT NULL,
                primary_emotion TEXT NOT NULL,
                risk_level TEXT NOT NULL,
                confidence REAL NOT NULL,
                created_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_messages_session ON chat_messages(session_id)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_snapshots_session ON emotion_snapshots(session_id)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Append a message to a session. Returns the new message id.
    pub async fn save_message(&self, session_id: &str, role: Role, content: &str) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().timestamp();

        sqlx::query(
            r#"
            INSERT INTO chat_messages (id, session_id, role, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&id)
        .bind(session_id)
        .bind(role.as_str())
        .bind(content)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    /// Load a session's messages in insertion order.
    pub async fn load_messages(&self, session_id: &str) -> Result<Vec<ConversationMessage>> {
        let rows = sqlx::query(
            r#"
            SELECT role, content
            FROM chat_messages
            WHERE session_id = $1
            ORDER BY rowid ASC
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let role: String = row.get("role");
                let content: String = row.get("content");
                Some(ConversationMessage {
                    role: role.parse().ok()?,
                    content,
                })
            })
            .collect())
    }

    /// Persist one integrated analysis result for later trend queries.
    pub async fn save_snapshot(
        &self,
        session_id: &str,
        vad: &VadScore,
        primary_emotion: &str,
        risk_level: &str,
        confidence: f64,
    ) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().timestamp();

        sqlx::query(
            r#"
            INSERT INTO emotion_snapshots
                (id, session_id, valence, arousal, dominance, primary_emotion,
                 risk_level, confidence, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&id)
        .bind(session_id)
        .bind(vad.valence)
        .bind(vad.arousal)
        .bind(vad.dominance)
        .bind(primary_emotion)
        .bind(risk_level)
        .bind(confidence)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    /// The most recent `limit` snapshots for a session, oldest first — the
    /// read-only history input for trend and pattern analysis.
    pub async fn recent_snapshots(
        &self,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<EmotionSnapshot>> {
        let rows = sqlx::query(
            r#"
            SELECT valence, arousal, dominance, primary_emotion, created_at
            FROM emotion_snapshots
            WHERE session_id = $1
            ORDER BY rowid DESC
            LIMIT $2
            "#,
        )
        .bind(session_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        let mut snapshots: Vec<EmotionSnapshot> = rows
            .into_iter()
            .map(|row| {
                let created_at: i64 = row.get("created_at");
                EmotionSnapshot {
                    timestamp: Utc
                        .timestamp_opt(created_at, 0)
                        .single()
                        .unwrap_or_else(Utc::now),
                    primary_emotion: row.get("primary_emotion"),
                    vad_score: VadScore::new(
                        row.get("valence"),
                        row.get("arousal"),
                        row.get("dominance"),
                    ),
                }
            })
            .collect();

        // Reverse to chronological order
        snapshots.reverse();
        Ok(snapshots)
    }
}
