// src/api/personas.rs

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GeneratePersonasRequest {
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub user_id: Option<String>,
    /// Accepted for parity with debate-mode clients; persona rows are not
    /// tied to a debate, the roster is resubmitted with every turn.
    #[serde(default)]
    pub debate_id: Option<String>,
}

/// POST /personas/generate
pub async fn generate_personas(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GeneratePersonasRequest>,
) -> Result<Json<Value>, ApiError> {
    if req.input.trim().is_empty() {
        return Err(ApiError::validation("Input is required"));
    }

    let personas = state
        .persona_generator
        .generate(req.input.trim(), req.user_id.as_deref())
        .await?;

    Ok(Json(json!({ "personas": personas })))
}

#[derive(Debug, Deserialize)]
pub struct ListPersonasQuery {
    #[serde(default)]
    pub user_id: Option<String>,
}

/// GET /personas
pub async fn list_personas(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListPersonasQuery>,
) -> Result<Json<Value>, ApiError> {
    let personas = state.personas.list(query.user_id.as_deref()).await?;
    Ok(Json(json!({ "personas": personas })))
}
