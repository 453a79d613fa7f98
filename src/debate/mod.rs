// src/debate/mod.rs
// Roundtable debate engine: turn selection and streamed reply relay.

pub mod relay;
pub mod turn;

use serde::{Deserialize, Serialize};

/// One participant as submitted with a turn request. The roster is fixed and
/// ordered; its order is the sole source of turn order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterMember {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}
