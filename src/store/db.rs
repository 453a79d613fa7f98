//! Database pool configuration and startup migrations

use anyhow::Result;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Executor;
use std::time::Duration;
use tracing::info;

/// Create a SQLite connection pool
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    SqlitePoolOptions::new()
        // SQLite is single-writer, but can have multiple readers
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))
}

const CREATE_PERSONAS: &str = r#"
CREATE TABLE IF NOT EXISTS personas (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    style TEXT NOT NULL,
    prompt TEXT NOT NULL,
    model TEXT,
    user_id TEXT,
    is_custom BOOLEAN NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL
);
"#;

const CREATE_DEBATES: &str = r#"
CREATE TABLE IF NOT EXISTS debates (
    id TEXT PRIMARY KEY,
    topic TEXT NOT NULL,
    user_id TEXT,
    status TEXT NOT NULL DEFAULT 'active',
    created_at INTEGER NOT NULL
);
"#;

const CREATE_MESSAGES: &str = r#"
CREATE TABLE IF NOT EXISTS messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    debate_id TEXT REFERENCES debates(id),
    persona_id TEXT,
    user_id TEXT,
    role TEXT NOT NULL,
    name TEXT NOT NULL,
    content TEXT NOT NULL,
    created_at INTEGER NOT NULL
);
"#;

const CREATE_INDICES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_messages_debate ON messages(debate_id, created_at, id);
CREATE INDEX IF NOT EXISTS idx_personas_user ON personas(user_id);
"#;

/// Runs all required migrations.
/// Safe to call at every startup (idempotent).
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    pool.execute(CREATE_PERSONAS).await?;
    pool.execute(CREATE_DEBATES).await?;
    pool.execute(CREATE_MESSAGES).await?;
    pool.execute(CREATE_INDICES).await?;

    info!("Migrations complete");
    Ok(())
}

/// Pool over an in-memory database with the schema applied. Used by tests.
pub async fn memory_pool() -> Result<SqlitePool> {
    // One connection only: each :memory: connection is its own database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    run_migrations(&pool).await?;
    Ok(pool)
}
