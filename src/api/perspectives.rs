// src/api/perspectives.rs

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::error::ApiError;
use crate::debate::RosterMember;
use crate::perspectives::PerspectiveMode;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PerspectivesRequest {
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub personas: Vec<RosterMember>,
    #[serde(default)]
    pub mode: PerspectiveMode,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// POST /perspectives
pub async fn generate_perspectives(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PerspectivesRequest>,
) -> Result<Json<Value>, ApiError> {
    if req.input.trim().is_empty() || req.personas.is_empty() {
        return Err(ApiError::validation("Personas and input are required"));
    }

    let responses = state
        .perspectives
        .generate(&req.input, &req.personas, req.mode, req.user_id.as_deref())
        .await?;

    Ok(Json(json!({ "responses": responses })))
}
