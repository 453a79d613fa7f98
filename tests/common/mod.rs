// tests/common/mod.rs
// Shared test fixtures: a scripted completion provider.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use futures::StreamExt;
use serde_json::{json, Value};

use prism::llm::{CompletionProvider, CompletionStream, LlmError};

/// Scripted provider: single-shot completions and SSE frame scripts are
/// handed out in the order they were queued. Every received request body is
/// recorded for assertions.
#[derive(Default)]
pub struct MockProvider {
    completions: Mutex<VecDeque<Value>>,
    streams: Mutex<VecDeque<Vec<String>>>,
    models: Mutex<Vec<String>>,
    pub requests: Mutex<Vec<Value>>,
}

#[allow(dead_code)]
impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a single-shot completion whose message content is `text`.
    pub fn push_completion(&self, text: &str) {
        self.completions.lock().unwrap().push_back(json!({
            "choices": [{ "message": { "role": "assistant", "content": text } }]
        }));
    }

    /// Queue an SSE script for the next streamed request. Each entry is one
    /// raw chunk exactly as the transport would deliver it.
    pub fn push_stream(&self, chunks: &[&str]) {
        self.streams
            .lock()
            .unwrap()
            .push_back(chunks.iter().map(|c| c.to_string()).collect());
    }

    /// Convenience: queue a stream that tokenizes `text` one word at a time
    /// and ends with the done sentinel.
    pub fn push_streamed_text(&self, text: &str) {
        let mut chunks: Vec<String> = text
            .split_inclusive(' ')
            .map(|token| {
                format!(
                    "data: {}\n\n",
                    json!({ "choices": [{ "delta": { "content": token } }] })
                )
            })
            .collect();
        chunks.push("data: [DONE]\n\n".to_string());
        let chunks: Vec<&str> = chunks.iter().map(String::as_str).collect();
        self.push_stream(&chunks);
    }

    pub fn set_models(&self, models: &[&str]) {
        *self.models.lock().unwrap() = models.iter().map(|m| m.to_string()).collect();
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn chat_completion(&self, body: Value) -> Result<Value, LlmError> {
        self.requests.lock().unwrap().push(body);
        self.completions
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| LlmError::MalformedResponse("no scripted completion left".into()))
    }

    async fn stream_chat_completion(&self, body: Value) -> Result<CompletionStream, LlmError> {
        self.requests.lock().unwrap().push(body);
        let chunks = self
            .streams
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| LlmError::MalformedResponse("no scripted stream left".into()))?;
        let frames: Vec<Result<Bytes, LlmError>> =
            chunks.into_iter().map(|c| Ok(Bytes::from(c))).collect();
        Ok(stream::iter(frames).boxed())
    }

    async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        Ok(self.models.lock().unwrap().clone())
    }
}
