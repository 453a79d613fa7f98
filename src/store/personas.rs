// src/store/personas.rs

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Row, SqlitePool};

use super::types::Persona;

#[derive(Clone)]
pub struct PersonaStore {
    pub pool: SqlitePool,
}

impl PersonaStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a batch of personas in one transaction.
    pub async fn insert_many(&self, personas: &[Persona]) -> Result<()> {
        let now = Utc::now().timestamp();
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        for persona in personas {
            sqlx::query(
                r#"
                INSERT INTO personas (id, name, style, prompt, model, user_id, is_custom, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&persona.id)
            .bind(&persona.name)
            .bind(&persona.style)
            .bind(&persona.prompt)
            .bind(&persona.model)
            .bind(&persona.user_id)
            .bind(persona.is_custom)
            .bind(now)
            .execute(&mut *tx)
            .await
            .context("Failed to insert persona")?;
        }

        tx.commit().await.context("Failed to commit personas")?;
        Ok(())
    }

    pub async fn get(&self, id: &str) -> Result<Option<Persona>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, style, prompt, model, user_id, is_custom
            FROM personas
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch persona by id")?;

        Ok(row.map(persona_from_row))
    }

    /// List personas, newest first. With a user id, only that user's rows.
    pub async fn list(&self, user_id: Option<&str>) -> Result<Vec<Persona>> {
        let rows = match user_id {
            Some(uid) => {
                sqlx::query(
                    r#"
                    SELECT id, name, style, prompt, model, user_id, is_custom
                    FROM personas
                    WHERE user_id = ?
                    ORDER BY created_at DESC, id DESC
                    "#,
                )
                .bind(uid)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT id, name, style, prompt, model, user_id, is_custom
                    FROM personas
                    ORDER BY created_at DESC, id DESC
                    "#,
                )
                .fetch_all(&self.pool)
                .await
            }
        }
        .context("Failed to list personas")?;

        Ok(rows.into_iter().map(persona_from_row).collect())
    }
}

fn persona_from_row(row: sqlx::sqlite::SqliteRow) -> Persona {
    Persona {
        id: row.get("id"),
        name: row.get("name"),
        style: row.get("style"),
        prompt: row.get("prompt"),
        model: row.get("model"),
        user_id: row.get("user_id"),
        is_custom: row.get("is_custom"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::db::memory_pool;

    fn sample(id: &str, name: &str) -> Persona {
        Persona {
            id: id.to_string(),
            name: name.to_string(),
            style: "Practical, skeptical".to_string(),
            prompt: "Respond with tough love.".to_string(),
            model: None,
            user_id: Some("user-1".to_string()),
            is_custom: true,
        }
    }

    #[tokio::test]
    async fn insert_and_get_roundtrip() {
        let pool = memory_pool().await.unwrap();
        let store = PersonaStore::new(pool);

        store
            .insert_many(&[sample("p1", "The Realist"), sample("p2", "The Dreamer")])
            .await
            .unwrap();

        let fetched = store.get("p1").await.unwrap().expect("persona p1 exists");
        assert_eq!(fetched.name, "The Realist");
        assert!(fetched.is_custom);

        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_filters_by_user() {
        let pool = memory_pool().await.unwrap();
        let store = PersonaStore::new(pool);

        let mut other = sample("p3", "The Cynic");
        other.user_id = Some("user-2".to_string());
        store
            .insert_many(&[sample("p1", "The Realist"), other])
            .await
            .unwrap();

        let mine = store.list(Some("user-1")).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, "p1");

        let all = store.list(None).await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
