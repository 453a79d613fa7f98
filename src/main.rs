// src/main.rs

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use prism::api;
use prism::config::CONFIG;
use prism::state::AppState;
use prism::store::db;

/// Graceful shutdown signal handler for SIGTERM and Ctrl+C
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(CONFIG.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting Perspective Prism backend");
    if CONFIG.groq_api_key.is_none() {
        // The server still boots; generation endpoints answer 500 until a
        // key is configured
        tracing::warn!("GROQ_API_KEY is not set, provider-backed endpoints will fail");
    }

    let database_url = CONFIG.require_database_url()?;
    let pool = db::create_pool(database_url).await?;

    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;
    sqlx::query("PRAGMA synchronous = NORMAL").execute(&pool).await?;

    db::run_migrations(&pool).await?;

    let state = Arc::new(AppState::from_config(pool));
    info!("Completion provider: {}", state.llm.name());
    let app = api::router(state);

    let bind_address = CONFIG.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("Listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}
