// src/store/types.rs

use serde::{Deserialize, Serialize};

/// A named behavioral profile that parameterizes one participant's replies.
/// Immutable once it has been used in a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    pub id: String,
    pub name: String,
    pub style: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub is_custom: bool,
}

/// One ongoing multi-turn exchange tied to a topic and a fixed roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Debate {
    pub id: String,
    pub topic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub status: DebateStatus,
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebateStatus {
    Active,
    Ongoing,
    Concluded,
}

impl std::fmt::Display for DebateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DebateStatus::Active => "active",
            DebateStatus::Ongoing => "ongoing",
            DebateStatus::Concluded => "concluded",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for DebateStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(DebateStatus::Active),
            "ongoing" => Ok(DebateStatus::Ongoing),
            "concluded" => Ok(DebateStatus::Concluded),
            _ => Err(()),
        }
    }
}

/// Append-only transcript entry. Ordering is created_at ascending with the
/// autoincrement id as the tie-breaker, so equal timestamps can never
/// reorder a transcript.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debate_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persona_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub role: MessageRole,
    pub name: String,
    pub content: String,
    pub created_at: i64,
}

/// Fields for a message row before insertion assigns id and created_at.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub debate_id: Option<String>,
    pub persona_id: Option<String>,
    pub user_id: Option<String>,
    pub role: MessageRole,
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Persona,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MessageRole::User => "user",
            MessageRole::Persona => "persona",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for MessageRole {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(MessageRole::User),
            "persona" => Ok(MessageRole::Persona),
            _ => Err(()),
        }
    }
}
