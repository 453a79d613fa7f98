// src/llm/client.rs

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use reqwest::{Client, Method, RequestBuilder};
use serde_json::Value;
use tracing::error;

use super::{CompletionProvider, CompletionStream, LlmError};
use crate::config::CONFIG;

/// Client for the Groq OpenAI-compatible chat-completions API.
///
/// The API key is optional at construction so a server without one still
/// boots; every actual request then fails with a configuration error that
/// the HTTP layer surfaces as a 500.
#[derive(Clone)]
pub struct GroqClient {
    client: Client,
    api_key: Option<String>,
    api_base: String,
}

impl GroqClient {
    pub fn from_config() -> Self {
        Self::with_config(CONFIG.groq_api_key.clone(), CONFIG.groq_base_url.clone())
    }

    pub fn with_config(api_key: Option<String>, api_base: impl Into<String>) -> Self {
        let client = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(
                CONFIG.groq_connect_timeout_secs,
            ))
            .build()
            .unwrap_or_default();
        Self {
            client,
            api_key,
            api_base: api_base.into(),
        }
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;
        Ok(self
            .client
            .request(
                method,
                format!(
                    "{}/{}",
                    self.api_base.trim_end_matches('/'),
                    path.trim_start_matches('/')
                ),
            )
            .header("Authorization", format!("Bearer {api_key}")))
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, LlmError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        error!("Groq API error {}: {}", status, body);
        Err(LlmError::Upstream { status, body })
    }
}

#[async_trait]
impl CompletionProvider for GroqClient {
    fn name(&self) -> &'static str {
        "groq"
    }

    /// Single-shot chat completion. The body carries model, messages, and
    /// sampling parameters; the caller owns that shape.
    async fn chat_completion(&self, body: Value) -> Result<Value, LlmError> {
        let response = self
            .request(Method::POST, "chat/completions")?
            .json(&body)
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Streaming chat completion. Returns the raw SSE byte stream; decoding
    /// is the relay's job.
    async fn stream_chat_completion(&self, body: Value) -> Result<CompletionStream, LlmError> {
        let response = self
            .request(Method::POST, "chat/completions")?
            .json(&body)
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        Ok(response.bytes_stream().map_err(LlmError::from).boxed())
    }

    async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        let response = self.request(Method::GET, "models")?.send().await?;
        let response = Self::check_status(response).await?;

        let catalog: Value = response.json().await?;
        let models = catalog
            .get("data")
            .and_then(|d| d.as_array())
            .ok_or_else(|| LlmError::MalformedResponse("models catalog is not an array".into()))?;

        Ok(models
            .iter()
            .filter_map(|m| m.get("id").and_then(|id| id.as_str()))
            .map(str::to_string)
            .collect())
    }
}
