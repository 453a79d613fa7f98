// src/perspectives/mod.rs
// Standard mode: one independent single-shot reply per selected persona,
// generated sequentially in roster order.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, warn};

use crate::config::CONFIG;
use crate::debate::turn::previous_exchange;
use crate::debate::RosterMember;
use crate::llm::{completion_text, CompletionProvider, LlmError};
use crate::store::{MessageRole, MessageStore, NewMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerspectiveMode {
    Standard,
    /// Each persona after the first is shown the preceding reply and asked
    /// to contrast with it. Stateless cousin of the debate turn.
    Debate,
}

impl Default for PerspectiveMode {
    fn default() -> Self {
        Self::Standard
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PerspectiveReply {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub style: String,
    pub response: String,
}

#[derive(Clone)]
pub struct PerspectiveEngine {
    llm: Arc<dyn CompletionProvider>,
    messages: MessageStore,
}

impl PerspectiveEngine {
    pub fn new(llm: Arc<dyn CompletionProvider>, messages: MessageStore) -> Self {
        Self { llm, messages }
    }

    /// One call per persona, in roster order, each independent of the
    /// others (no fan-out). A failed provider call skips that persona and
    /// continues; only a missing API key aborts the whole batch.
    pub async fn generate(
        &self,
        input: &str,
        personas: &[RosterMember],
        mode: PerspectiveMode,
        user_id: Option<&str>,
    ) -> Result<Vec<PerspectiveReply>, LlmError> {
        info!(
            "Generating responses for {} personas on topic: {input}",
            personas.len()
        );

        let mut results = Vec::with_capacity(personas.len());
        // Replies staged so far, in transcript form, so the contrast prompt
        // can resolve the previous speaker the same way debate turns do
        let mut staged: Vec<NewMessage> = Vec::new();

        for persona in personas {
            let system = format!("{}. Limit to 200 words.", persona.prompt);
            let user_message = match mode {
                PerspectiveMode::Debate => {
                    let previous = previous_exchange(&staged, input);
                    if previous.is_user() {
                        topic_message(input)
                    } else {
                        format!(
                            "Previous persona **{}** said:\n\"{}\"\n\nRespond with your contrasting perspective.",
                            previous.speaker, previous.content
                        )
                    }
                }
                PerspectiveMode::Standard => topic_message(input),
            };

            let body = json!({
                "model": persona.model.as_deref().unwrap_or(&CONFIG.perspective_model),
                "messages": [
                    { "role": "system", "content": system },
                    { "role": "user", "content": user_message },
                ],
                "temperature": 0.9,
                "max_tokens": 500,
            });

            let reply = match self.llm.chat_completion(body).await {
                Ok(response) => match completion_text(&response) {
                    Ok(text) => text.to_string(),
                    Err(_) => "No response.".to_string(),
                },
                Err(LlmError::MissingApiKey) => return Err(LlmError::MissingApiKey),
                Err(e) => {
                    warn!("Error generating response for {}: {e}", persona.name);
                    continue;
                }
            };

            let row = NewMessage {
                debate_id: None,
                persona_id: persona.id.clone(),
                user_id: user_id.map(str::to_string),
                role: MessageRole::Persona,
                name: persona.name.clone(),
                content: reply.clone(),
            };

            // Only personas that exist as rows get their reply persisted
            if persona.id.is_some() {
                if let Err(e) = self.messages.insert(&row).await {
                    error!("Error inserting message for {}: {e:#}", persona.name);
                }
            }
            staged.push(row);

            results.push(PerspectiveReply {
                id: persona.id.clone(),
                name: persona.name.clone(),
                style: persona.style.clone().unwrap_or_default(),
                response: reply,
            });
        }

        info!("Successfully generated {} responses", results.len());
        Ok(results)
    }
}

fn topic_message(input: &str) -> String {
    format!("Topic: {input}. Please provide your perspective on this.")
}
