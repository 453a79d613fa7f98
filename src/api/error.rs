// src/api/error.rs

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use crate::llm::LlmError;
use crate::persona::PersonaGeneratorError;

/// Request-terminal failures. Validation problems are the caller's fault
/// (400); everything else surfaces as 500 and is logged for diagnosis.
/// Nothing here is retried.
#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    NotFound(String),
    Upstream(String),
    Store(String),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Upstream(msg) => {
                error!("Upstream provider error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
            ApiError::Store(msg) => {
                error!("Store error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<LlmError> for ApiError {
    fn from(err: LlmError) -> Self {
        ApiError::Upstream(err.to_string())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Store(format!("{err:#}"))
    }
}

impl From<PersonaGeneratorError> for ApiError {
    fn from(err: PersonaGeneratorError) -> Self {
        match err {
            PersonaGeneratorError::Store(e) => e.into(),
            other => ApiError::Upstream(other.to_string()),
        }
    }
}
