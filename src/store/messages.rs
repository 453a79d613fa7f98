// src/store/messages.rs

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Row, SqlitePool};

use super::types::{Message, MessageRole, NewMessage};

#[derive(Clone)]
pub struct MessageStore {
    pub pool: SqlitePool,
}

impl MessageStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append one message. Rows are never updated afterwards.
    pub async fn insert(&self, message: &NewMessage) -> Result<i64> {
        let created_at = Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO messages (debate_id, persona_id, user_id, role, name, content, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&message.debate_id)
        .bind(&message.persona_id)
        .bind(&message.user_id)
        .bind(message.role.to_string())
        .bind(&message.name)
        .bind(&message.content)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .context("Failed to insert message")?;

        Ok(result.last_insert_rowid())
    }

    /// Full transcript for a debate, chronological. Equal timestamps keep
    /// insertion order via the id tie-breaker.
    pub async fn transcript(&self, debate_id: &str) -> Result<Vec<Message>> {
        let rows = sqlx::query(
            r#"
            SELECT id, debate_id, persona_id, user_id, role, name, content, created_at
            FROM messages
            WHERE debate_id = ?
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(debate_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch transcript")?;

        Ok(rows
            .into_iter()
            .filter_map(|r| {
                let role: String = r.get("role");
                // Rows with an unknown role label are skipped rather than
                // poisoning the whole transcript read
                let role: MessageRole = role.parse().ok()?;
                Some(Message {
                    id: r.get("id"),
                    debate_id: r.get("debate_id"),
                    persona_id: r.get("persona_id"),
                    user_id: r.get("user_id"),
                    role,
                    name: r.get("name"),
                    content: r.get("content"),
                    created_at: r.get("created_at"),
                })
            })
            .collect())
    }
}
