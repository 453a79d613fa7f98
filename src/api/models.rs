// src/api/models.rs

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;

use super::error::ApiError;
use crate::config::CONFIG;
use crate::state::AppState;

/// GET /models
///
/// Provider model catalog, narrowed to ids containing one of the
/// configured family markers.
pub async fn list_models(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let catalog = state.llm.list_models().await?;
    let models = filter_models(catalog, &CONFIG.family_markers());
    Ok(Json(json!({ "models": models })))
}

fn filter_models(catalog: Vec<String>, markers: &[String]) -> Vec<String> {
    catalog
        .into_iter()
        .filter(|id| markers.iter().any(|marker| id.contains(marker.as_str())))
        .collect()
}
