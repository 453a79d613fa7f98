// src/debate/relay.rs
// Pass-through relay between the provider's SSE token stream and the HTTP
// response body, plus persistence of the finished reply.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tracing::{error, warn};

use crate::llm::sse::{delta_from_frame, FrameDelta, SseLineBuffer};
use crate::store::{MessageStore, NewMessage};

struct RelayState {
    accumulated: String,
    // Flipped off once the caller stops listening; the stream keeps draining
    // so the accumulated text can still be persisted.
    forwarding: bool,
}

impl RelayState {
    async fn handle_line(&mut self, line: &str, tx: &mpsc::Sender<Bytes>) {
        match delta_from_frame(line) {
            FrameDelta::Token(token) => {
                self.accumulated.push_str(&token);
                if self.forwarding && tx.send(Bytes::from(token)).await.is_err() {
                    warn!("caller disconnected mid-stream, continuing for persistence");
                    self.forwarding = false;
                }
            }
            FrameDelta::Done | FrameDelta::Empty => {}
            FrameDelta::Malformed => {
                warn!("skipping malformed stream frame: {line}");
            }
        }
    }
}

/// Drain one provider stream: forward each decoded token to `tx` as it
/// arrives, accumulate the full text, and return it once the transport
/// closes. Forwarding strictly precedes persistence.
pub async fn pump<S, E>(mut upstream: S, tx: &mpsc::Sender<Bytes>) -> String
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: std::fmt::Display,
{
    let mut buffer = SseLineBuffer::new();
    let mut state = RelayState {
        accumulated: String::new(),
        forwarding: true,
    };

    while let Some(chunk) = upstream.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                // Whatever accumulated so far still gets persisted
                warn!("provider stream ended early: {e}");
                break;
            }
        };
        for line in buffer.push(&chunk) {
            state.handle_line(&line, tx).await;
        }
    }

    if let Some(tail) = buffer.finish() {
        state.handle_line(&tail, tx).await;
    }

    state.accumulated
}

/// Run one relay to completion and persist the reply. `reply` carries the
/// chosen persona's identity; its content field is replaced with the
/// accumulated text. An all-whitespace result persists nothing and the
/// caller simply observes an empty body.
///
/// `tx` stays open until persistence finishes, so the caller's stream only
/// closes once the row is safely written.
pub async fn run<S, E>(
    upstream: S,
    tx: mpsc::Sender<Bytes>,
    store: &MessageStore,
    reply: NewMessage,
) -> String
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: std::fmt::Display,
{
    let accumulated = pump(upstream, &tx).await;

    if accumulated.trim().is_empty() {
        return accumulated;
    }

    let row = NewMessage {
        content: accumulated.clone(),
        ..reply
    };
    if let Err(e) = store.insert(&row).await {
        // The caller already received the streamed text; losing the row is
        // logged, not surfaced
        error!("failed to persist debate reply for {}: {e:#}", row.name);
    }

    accumulated
}
