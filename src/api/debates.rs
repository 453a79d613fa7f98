// src/api/debates.rs
// Debate sessions: creation, transcript reads, and the streamed turn
// endpoint.

use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::Response;
use axum::Json;
use bytes::Bytes;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tracing::info;
use uuid::Uuid;

use super::error::ApiError;
use crate::config::CONFIG;
use crate::debate::{relay, turn, RosterMember};
use crate::state::AppState;
use crate::store::{Debate, MessageRole, NewMessage};

#[derive(Debug, Deserialize)]
pub struct CreateDebateRequest {
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// POST /debates
pub async fn create_debate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateDebateRequest>,
) -> Result<Json<Debate>, ApiError> {
    if req.topic.trim().is_empty() {
        return Err(ApiError::validation("Topic is required"));
    }

    let id = Uuid::new_v4().to_string();
    let debate = state
        .debates
        .create(&id, req.topic.trim(), req.user_id.as_deref())
        .await?;

    Ok(Json(debate))
}

/// GET /debates/{id}/messages
pub async fn debate_messages(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let debate = state
        .debates
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Debate not found"))?;

    let messages = state.messages.transcript(&debate.id).await?;
    Ok(Json(json!({ "messages": messages })))
}

#[derive(Debug, Deserialize)]
pub struct DebateTurnRequest {
    #[serde(default)]
    pub debate_id: String,
    #[serde(default)]
    pub personas: Vec<RosterMember>,
    #[serde(default)]
    pub user_input: Option<String>,
}

/// POST /debates/turn
///
/// Advances the debate by one persona reply, streamed back as a raw
/// `text/plain` body. The reply is persisted when the provider stream
/// closes, whether or not the caller is still reading.
pub async fn debate_turn(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DebateTurnRequest>,
) -> Result<Response, ApiError> {
    if req.debate_id.trim().is_empty() || req.personas.is_empty() {
        return Err(ApiError::validation(
            "Missing or invalid debateId or personas.",
        ));
    }

    let mut transcript = state.messages.transcript(&req.debate_id).await?;

    // Seed the transcript with the user's opening statement on the first
    // turn of a fresh debate
    let provided_input = req
        .user_input
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    if transcript.is_empty() {
        if let Some(input) = provided_input {
            state
                .messages
                .insert(&NewMessage {
                    debate_id: Some(req.debate_id.clone()),
                    persona_id: None,
                    user_id: None,
                    role: MessageRole::User,
                    name: "You".to_string(),
                    content: input.to_string(),
                })
                .await?;
            transcript = state.messages.transcript(&req.debate_id).await?;
        }
    }

    let user_input = transcript
        .iter()
        .find(|m| m.role == MessageRole::User)
        .map(|m| m.content.clone())
        .or_else(|| provided_input.map(str::to_string))
        .unwrap_or_default();

    let plan = turn::plan_turn(&req.personas, &transcript, &user_input)
        .ok_or_else(|| ApiError::validation("Missing or invalid debateId or personas."))?;
    info!("Next persona: {}", plan.speaker.name);

    let body = plan.completion_body(&CONFIG.debate_model);
    let upstream = state.llm.stream_chat_completion(body).await?;

    let reply = NewMessage {
        debate_id: Some(req.debate_id.clone()),
        persona_id: plan.speaker.id.clone(),
        user_id: None,
        role: MessageRole::Persona,
        name: plan.speaker.name.clone(),
        content: String::new(),
    };

    // The relay runs detached: a caller that disconnects mid-stream must
    // not stop the reply from being persisted
    let (tx, rx) = mpsc::channel::<Bytes>(32);
    let messages = state.messages.clone();
    tokio::spawn(async move {
        relay::run(upstream, tx, &messages, reply).await;
    });

    let stream = ReceiverStream::new(rx).map(Ok::<_, Infallible>);
    let response = Response::builder()
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from_stream(stream))
        .map_err(|e| ApiError::Store(e.to_string()))?;

    Ok(response)
}
