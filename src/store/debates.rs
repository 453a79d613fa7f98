// src/store/debates.rs

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Row, SqlitePool};

use super::types::{Debate, DebateStatus};

#[derive(Clone)]
pub struct DebateStore {
    pub pool: SqlitePool,
}

impl DebateStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, id: &str, topic: &str, user_id: Option<&str>) -> Result<Debate> {
        let created_at = Utc::now().timestamp();
        let status = DebateStatus::Active;

        sqlx::query(
            r#"
            INSERT INTO debates (id, topic, user_id, status, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(topic)
        .bind(user_id)
        .bind(status.to_string())
        .bind(created_at)
        .execute(&self.pool)
        .await
        .context("Failed to create debate")?;

        Ok(Debate {
            id: id.to_string(),
            topic: topic.to_string(),
            user_id: user_id.map(str::to_string),
            status,
            created_at,
        })
    }

    pub async fn get(&self, id: &str) -> Result<Option<Debate>> {
        let row = sqlx::query(
            r#"
            SELECT id, topic, user_id, status, created_at
            FROM debates
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch debate by id")?;

        Ok(row.map(|r| {
            let status: String = r.get("status");
            Debate {
                id: r.get("id"),
                topic: r.get("topic"),
                user_id: r.get("user_id"),
                // Unknown labels fall back to active rather than failing the read
                status: status.parse().unwrap_or(DebateStatus::Active),
                created_at: r.get("created_at"),
            }
        }))
    }

    pub async fn set_status(&self, id: &str, status: DebateStatus) -> Result<()> {
        sqlx::query("UPDATE debates SET status = ? WHERE id = ?")
            .bind(status.to_string())
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update debate status")?;

        Ok(())
    }
}
