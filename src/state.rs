// src/state.rs

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::llm::{CompletionProvider, GroqClient};
use crate::persona::PersonaGenerator;
use crate::perspectives::PerspectiveEngine;
use crate::store::{DebateStore, MessageStore, PersonaStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub personas: PersonaStore,
    pub debates: DebateStore,
    pub messages: MessageStore,
    pub llm: Arc<dyn CompletionProvider>,
    pub persona_generator: PersonaGenerator,
    pub perspectives: PerspectiveEngine,
}

impl AppState {
    pub fn new(pool: SqlitePool, llm: Arc<dyn CompletionProvider>) -> Self {
        let personas = PersonaStore::new(pool.clone());
        let debates = DebateStore::new(pool.clone());
        let messages = MessageStore::new(pool.clone());

        let persona_generator = PersonaGenerator::new(llm.clone(), personas.clone());
        let perspectives = PerspectiveEngine::new(llm.clone(), messages.clone());

        Self {
            pool,
            personas,
            debates,
            messages,
            llm,
            persona_generator,
            perspectives,
        }
    }

    /// Production wiring: Groq client configured from the environment.
    pub fn from_config(pool: SqlitePool) -> Self {
        Self::new(pool, Arc::new(GroqClient::from_config()))
    }
}
