// src/llm/sse.rs
// Decoding for the provider's Server-Sent-Events token stream.
//
// The provider frames incremental completions as newline-delimited
// `data: <json>` lines ending with a `data: [DONE]` sentinel. Network reads
// do not respect frame boundaries, so a line can arrive split across two
// chunks; partial lines are carried over and parsed only once the
// terminating newline shows up.

use serde_json::Value;

/// Carries partial SSE lines across chunk boundaries.
#[derive(Debug, Default)]
pub struct SseLineBuffer {
    carry: Vec<u8>,
}

impl SseLineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one network chunk; returns every line completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.carry.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.carry.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.carry.drain(..=pos).collect();
            line.pop(); // the newline itself
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            lines.push(String::from_utf8_lossy(&line).into_owned());
        }
        lines
    }

    /// Whatever is left once the transport closes. A final frame without a
    /// trailing newline still counts.
    pub fn finish(&mut self) -> Option<String> {
        if self.carry.is_empty() {
            return None;
        }
        let line = String::from_utf8_lossy(&self.carry).into_owned();
        self.carry.clear();
        Some(line)
    }
}

/// Outcome of decoding one SSE line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameDelta {
    /// Incremental completion text to forward and accumulate
    Token(String),
    /// The `[DONE]` sentinel; discarded, not an error
    Done,
    /// A well-formed frame with nothing to forward (empty delta, keep-alive)
    Empty,
    /// Payload failed to parse as JSON; skipped with a warning upstream
    Malformed,
}

/// Decode one line into a delta.
pub fn delta_from_frame(line: &str) -> FrameDelta {
    let line = line.trim();
    if line.is_empty() {
        return FrameDelta::Empty;
    }

    let payload = line
        .strip_prefix("data:")
        .map(str::trim_start)
        .unwrap_or(line);

    if payload == "[DONE]" {
        return FrameDelta::Done;
    }

    let parsed: Value = match serde_json::from_str(payload) {
        Ok(v) => v,
        Err(_) => return FrameDelta::Malformed,
    };

    match parsed
        .pointer("/choices/0/delta/content")
        .and_then(|c| c.as_str())
    {
        Some(token) if !token.is_empty() => FrameDelta::Token(token.to_string()),
        _ => FrameDelta::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_yields_complete_lines_only() {
        let mut buf = SseLineBuffer::new();
        assert!(buf.push(b"data: {\"a\":").is_empty());
        let lines = buf.push(b"1}\n\ndata: [DONE]\n");
        assert_eq!(lines, vec!["data: {\"a\":1}", "", "data: [DONE]"]);
        assert!(buf.finish().is_none());
    }

    #[test]
    fn buffer_strips_carriage_returns() {
        let mut buf = SseLineBuffer::new();
        let lines = buf.push(b"data: [DONE]\r\n");
        assert_eq!(lines, vec!["data: [DONE]"]);
    }

    #[test]
    fn finish_flushes_unterminated_tail() {
        let mut buf = SseLineBuffer::new();
        assert!(buf.push(b"data: [DONE]").is_empty());
        assert_eq!(buf.finish().as_deref(), Some("data: [DONE]"));
        assert!(buf.finish().is_none());
    }

    #[test]
    fn multibyte_text_split_across_chunks_survives() {
        let frame = "data: {\"choices\":[{\"delta\":{\"content\":\"héllo\"}}]}\n".as_bytes();
        // split between the two bytes of the é
        let split = frame.iter().position(|&b| b == 0xC3).unwrap() + 1;
        let (a, b) = frame.split_at(split);
        let mut buf = SseLineBuffer::new();
        assert!(buf.push(a).is_empty());
        let lines = buf.push(b);
        assert_eq!(lines.len(), 1);
        assert_eq!(
            delta_from_frame(&lines[0]),
            FrameDelta::Token("héllo".to_string())
        );
    }

    #[test]
    fn token_frames_decode() {
        let delta = delta_from_frame(r#"data: {"choices":[{"delta":{"content":"Hi"}}]}"#);
        assert_eq!(delta, FrameDelta::Token("Hi".to_string()));
    }

    #[test]
    fn done_sentinel_is_not_an_error() {
        assert_eq!(delta_from_frame("data: [DONE]"), FrameDelta::Done);
        assert_eq!(delta_from_frame("data:[DONE]"), FrameDelta::Done);
    }

    #[test]
    fn blank_and_deltaless_frames_are_empty() {
        assert_eq!(delta_from_frame(""), FrameDelta::Empty);
        assert_eq!(delta_from_frame("   "), FrameDelta::Empty);
        // role-announcement frame carries no content
        let delta = delta_from_frame(r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#);
        assert_eq!(delta, FrameDelta::Empty);
        // empty-string deltas are not forwarded
        let delta = delta_from_frame(r#"data: {"choices":[{"delta":{"content":""}}]}"#);
        assert_eq!(delta, FrameDelta::Empty);
    }

    #[test]
    fn garbage_is_malformed_not_fatal() {
        assert_eq!(delta_from_frame("data: {not json"), FrameDelta::Malformed);
        assert_eq!(delta_from_frame("random noise"), FrameDelta::Malformed);
    }
}
