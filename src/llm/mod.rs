// src/llm/mod.rs

pub mod client;
pub mod sse;

pub use client::GroqClient;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use serde_json::Value;
use thiserror::Error;

/// Failures talking to the completion provider. None of these are retried;
/// every variant is terminal for the current request.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("GROQ_API_KEY is not configured")]
    MissingApiKey,

    #[error("provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("provider returned {status}: {body}")]
    Upstream {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("provider response carried no completion text")]
    EmptyCompletion,

    #[error("provider response was not the expected shape: {0}")]
    MalformedResponse(String),
}

/// The raw SSE byte stream of one in-flight completion.
pub type CompletionStream = BoxStream<'static, Result<Bytes, LlmError>>;

/// Chat-completion provider interface. The request/response bodies stay as
/// `serde_json::Value` in the provider's own wire shape; callers own the
/// body layout, implementations own transport and authentication.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &'static str;

    /// Single-shot completion: one request, one full JSON response.
    async fn chat_completion(&self, body: Value) -> Result<Value, LlmError>;

    /// Streamed completion: the response arrives as SSE frames; decoding is
    /// the caller's job.
    async fn stream_chat_completion(&self, body: Value) -> Result<CompletionStream, LlmError>;

    /// Model catalog ids, unfiltered.
    async fn list_models(&self) -> Result<Vec<String>, LlmError>;
}

/// Pull the completion text out of a non-streamed chat response.
pub fn completion_text(response: &Value) -> Result<&str, LlmError> {
    response
        .pointer("/choices/0/message/content")
        .and_then(|c| c.as_str())
        .ok_or(LlmError::EmptyCompletion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn completion_text_reads_first_choice() {
        let response = json!({
            "choices": [{ "message": { "role": "assistant", "content": "Hello" } }]
        });
        assert_eq!(completion_text(&response).unwrap(), "Hello");

        let empty = json!({ "choices": [] });
        assert!(matches!(
            completion_text(&empty),
            Err(LlmError::EmptyCompletion)
        ));
    }
}
