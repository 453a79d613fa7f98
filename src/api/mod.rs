// src/api/mod.rs

pub mod debates;
pub mod error;
pub mod health;
pub mod models;
pub mod personas;
pub mod perspectives;

pub use error::ApiError;

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::CONFIG;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/models", get(models::list_models))
        .route("/personas", get(personas::list_personas))
        .route("/personas/generate", post(personas::generate_personas))
        .route("/perspectives", post(perspectives::generate_perspectives))
        .route("/debates", post(debates::create_debate))
        .route("/debates/{id}/messages", get(debates::debate_messages))
        .route("/debates/turn", post(debates::debate_turn))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match CONFIG.cors_origin.as_str() {
        "*" => layer.allow_origin(Any),
        origin => match origin.parse::<HeaderValue>() {
            Ok(value) => layer.allow_origin(value),
            Err(_) => {
                tracing::warn!("Invalid CORS origin {origin:?}, allowing any");
                layer.allow_origin(Any)
            }
        },
    }
}
