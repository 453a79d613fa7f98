// src/debate/turn.rs
// Turn selection for roundtable debates.
//
// The roster order is the only source of turn order. A persona counts as
// having spoken if any transcript entry carries its name, regardless of how
// long ago; user interjections never consume a turn. Matching is by display
// name, the same key the transcript stores.

use std::collections::HashSet;

use serde_json::{json, Value};

use super::RosterMember;
use crate::store::{Message, MessageRole, NewMessage};

/// Minimal view of one transcript entry, implemented by both persisted rows
/// and rows staged for insertion.
pub trait TranscriptEntry {
    fn role(&self) -> MessageRole;
    fn speaker(&self) -> &str;
    fn content(&self) -> &str;
}

impl TranscriptEntry for Message {
    fn role(&self) -> MessageRole {
        self.role
    }
    fn speaker(&self) -> &str {
        &self.name
    }
    fn content(&self) -> &str {
        &self.content
    }
}

impl TranscriptEntry for NewMessage {
    fn role(&self) -> MessageRole {
        self.role
    }
    fn speaker(&self) -> &str {
        &self.name
    }
    fn content(&self) -> &str {
        &self.content
    }
}

/// What the next reply answers: the most recent persona entry, or the user
/// when no persona has spoken yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviousExchange {
    pub speaker: String,
    pub content: String,
}

impl PreviousExchange {
    pub fn is_user(&self) -> bool {
        self.speaker == "User"
    }
}

/// Pick the next speaker: first roster member that has never spoken, so
/// every persona gets one turn before any repeats; once all have spoken,
/// strict round-robin on the persona-message count.
pub fn next_speaker<'a, T: TranscriptEntry>(
    roster: &'a [RosterMember],
    transcript: &[T],
) -> Option<&'a RosterMember> {
    if roster.is_empty() {
        return None;
    }

    let spoken: HashSet<&str> = transcript
        .iter()
        .filter(|m| m.role() == MessageRole::Persona)
        .map(|m| m.speaker())
        .collect();

    if let Some(fresh) = roster.iter().find(|p| !spoken.contains(p.name.as_str())) {
        return Some(fresh);
    }

    let turns_taken = transcript
        .iter()
        .filter(|m| m.role() == MessageRole::Persona)
        .count();
    Some(&roster[turns_taken % roster.len()])
}

/// Resolve who spoke last and what they said. Falls back to the user's
/// opening statement (first user entry, or `user_input` when the transcript
/// has none) before any persona has spoken.
pub fn previous_exchange<T: TranscriptEntry>(transcript: &[T], user_input: &str) -> PreviousExchange {
    if let Some(last) = transcript
        .iter()
        .rev()
        .find(|m| m.role() == MessageRole::Persona)
    {
        return PreviousExchange {
            speaker: last.speaker().to_string(),
            content: last.content().to_string(),
        };
    }

    let opening = transcript
        .iter()
        .find(|m| m.role() == MessageRole::User)
        .map(|m| m.content())
        .unwrap_or(user_input);

    PreviousExchange {
        speaker: "User".to_string(),
        content: opening.to_string(),
    }
}

/// Re-label the whole transcript into the provider's two-role exchange
/// format: every entry becomes a `user` message prefixed with its speaker,
/// which keeps multi-party dialogue legible to a two-role API.
pub fn relabel_transcript<T: TranscriptEntry>(transcript: &[T]) -> Vec<Value> {
    transcript
        .iter()
        .map(|m| {
            json!({
                "role": "user",
                "content": format!("{}: {}", m.speaker(), m.content()),
            })
        })
        .collect()
}

fn opening_prompt(speaker: &RosterMember, user_input: &str) -> String {
    format!(
        "{}\n\nYou are {}, a unique persona in a thoughtful roundtable debate.\n\n\
         The user started the conversation with:\n\"{}\"\n\n\
         Respond directly to the user's statement above as your opening perspective. \
         Stay in character, introduce your viewpoint, and set the stage for a thoughtful debate. \
         Keep it short: 1-2 concise paragraphs.",
        speaker.prompt, speaker.name, user_input
    )
}

fn response_prompt(speaker: &RosterMember, user_input: &str, previous: &PreviousExchange) -> String {
    format!(
        "{}\n\nYou are {}, a unique persona in a thoughtful roundtable debate.\n\n\
         The user started the conversation with:\n\"{}\"\n\n\
         You are responding to {}, who said:\n\"{}\"\n\n\
         Stay in character. Refer to {} by name. Challenge or build on their point respectfully. \
         Add new insights. Keep it short: 1-2 concise paragraphs.",
        speaker.prompt,
        speaker.name,
        user_input,
        previous.speaker,
        previous.content,
        previous.speaker
    )
}

/// The chosen speaker plus the full provider message list for its reply.
#[derive(Debug, Clone)]
pub struct TurnPlan<'a> {
    pub speaker: &'a RosterMember,
    pub previous: PreviousExchange,
    pub system_prompt: String,
    pub messages: Vec<Value>,
}

impl TurnPlan<'_> {
    /// Streamed completion request body. Replies are bounded to roughly two
    /// short paragraphs.
    pub fn completion_body(&self, default_model: &str) -> Value {
        json!({
            "model": self.speaker.model.as_deref().unwrap_or(default_model),
            "temperature": 0.9,
            "max_completion_tokens": 300,
            "top_p": 1,
            "stream": true,
            "messages": self.messages,
        })
    }
}

/// Assemble the next turn: speaker, behavioral system prompt, and the
/// relabeled transcript. Returns `None` on an empty roster, which the HTTP
/// layer rejects before ever calling in here.
pub fn plan_turn<'a, T: TranscriptEntry>(
    roster: &'a [RosterMember],
    transcript: &[T],
    user_input: &str,
) -> Option<TurnPlan<'a>> {
    let speaker = next_speaker(roster, transcript)?;
    let previous = previous_exchange(transcript, user_input);

    let system_prompt = if previous.is_user() {
        opening_prompt(speaker, user_input)
    } else {
        response_prompt(speaker, user_input, &previous)
    };

    let mut messages = Vec::with_capacity(transcript.len() + 1);
    messages.push(json!({ "role": "system", "content": system_prompt }));
    messages.extend(relabel_transcript(transcript));

    Some(TurnPlan {
        speaker,
        previous,
        system_prompt,
        messages,
    })
}
