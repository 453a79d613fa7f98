// src/persona/generator.rs
// Turns a free-text reflection into 3-4 persisted personas.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::CONFIG;
use crate::llm::{completion_text, CompletionProvider, LlmError};
use crate::store::{Persona, PersonaStore};

/// Instructional preamble for the generation request. The model must answer
/// with a raw JSON array; anything else is rejected as a parse error.
const PERSONA_PREAMBLE: &str = r#"
You are an AI persona generator.
Your job is to analyze a user's input reflection or dilemma, then generate 3 to 4 unique thought personas.

Each persona must be:
- Intellectually distinct
- Emotionally or stylistically diverse
- Able to challenge, comfort, or provoke the user in different ways

Each persona should include:
- A short creative name (1-3 words)
- A style summary (tone, voice, perspective)
- A system prompt: how this persona should think/respond

Encourage contrast: include at least one critical, cynical, or provocative voice.

Only respond in raw JSON format with an array of personas.
Example:
[
  {
    "name": "The Realist",
    "style": "Practical, skeptical, grounded",
    "prompt": "Respond with tough love, challenging assumptions with realism and logic."
  }
]
"#;

#[derive(Debug, Error)]
pub enum PersonaGeneratorError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("persona response was not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Persona descriptor as the model emits it. A provider-supplied id is
/// reused; otherwise one is minted before persistence.
#[derive(Debug, Deserialize)]
struct GeneratedPersona {
    #[serde(default)]
    id: Option<String>,
    name: String,
    style: String,
    prompt: String,
}

#[derive(Clone)]
pub struct PersonaGenerator {
    llm: Arc<dyn CompletionProvider>,
    store: PersonaStore,
}

impl PersonaGenerator {
    pub fn new(llm: Arc<dyn CompletionProvider>, store: PersonaStore) -> Self {
        Self { llm, store }
    }

    /// Single-shot generation: one provider call, strict JSON parse, batch
    /// insert, and the personas come back to the caller. A persona row that
    /// fails to persist is a store error even though generation succeeded;
    /// nothing is rolled back.
    pub async fn generate(
        &self,
        input: &str,
        user_id: Option<&str>,
    ) -> Result<Vec<Persona>, PersonaGeneratorError> {
        info!("Generating personas for input: {input}");

        let body = json!({
            "model": CONFIG.persona_model,
            "messages": [
                { "role": "system", "content": PERSONA_PREAMBLE },
                { "role": "user", "content": input },
            ],
            "temperature": 0.9,
            "max_tokens": 800,
        });

        let response = self.llm.chat_completion(body).await?;
        let content = completion_text(&response)?;

        let generated = parse_personas(content)?;
        let personas: Vec<Persona> = generated
            .into_iter()
            .map(|p| Persona {
                id: p.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
                name: p.name,
                style: p.style,
                prompt: p.prompt,
                model: None,
                user_id: user_id.map(str::to_string),
                is_custom: true,
            })
            .collect();

        self.store.insert_many(&personas).await?;
        info!("Generated and inserted {} personas", personas.len());

        Ok(personas)
    }
}

fn parse_personas(content: &str) -> Result<Vec<GeneratedPersona>, PersonaGeneratorError> {
    serde_json::from_str(content).map_err(|e| {
        error!("Failed to parse persona response as JSON: {content}");
        PersonaGeneratorError::Parse(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_raw_json_array() {
        let content = r#"[
            {"name": "The Realist", "style": "Practical", "prompt": "Tough love."},
            {"id": "p-7", "name": "The Dreamer", "style": "Hopeful", "prompt": "Imagine."}
        ]"#;
        let personas = parse_personas(content).unwrap();
        assert_eq!(personas.len(), 2);
        assert!(personas[0].id.is_none());
        assert_eq!(personas[1].id.as_deref(), Some("p-7"));
        assert_eq!(personas[1].name, "The Dreamer");
    }

    #[test]
    fn fenced_or_chatty_output_is_rejected() {
        let fenced = "```json\n[{\"name\":\"A\",\"style\":\"s\",\"prompt\":\"p\"}]\n```";
        assert!(matches!(
            parse_personas(fenced),
            Err(PersonaGeneratorError::Parse(_))
        ));

        let chatty = "Here are your personas: [...]";
        assert!(parse_personas(chatty).is_err());
    }

    #[test]
    fn missing_fields_are_a_parse_error() {
        let content = r#"[{"name": "Nameless"}]"#;
        assert!(parse_personas(content).is_err());
    }
}
