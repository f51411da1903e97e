//! Event-stream aggregation
//!
//! Folds an upstream `text/event-stream` body into one
//! [`CompletionResponse`]. The body is consumed chunk by chunk: chunks are
//! split into newline-terminated lines, lines starting with `data:` are
//! frames, and each frame's JSON is merged into a [`StreamAccumulator`].
//!
//! Merge policy for frame fields (all optional):
//! - `id`, `created`, `model`: first non-empty value wins
//! - `choices[0].delta.content`: appended in arrival order
//! - `choices[0].finish_reason`: last non-empty value wins
//!
//! Frames that are not valid JSON are skipped. `data: [DONE]`, end of
//! body and a read error all finalize from whatever has been accumulated.

use std::fmt::Display;
use std::time::{SystemTime, UNIX_EPOCH};

use futures_util::{Stream, StreamExt};
use serde_json::Value;

use crate::types::{ChatCompletionObject, Choice, ChoiceMessage, CompletionResponse};

/// Frame payload that ends the stream
const DONE_MARKER: &str = "[DONE]";

/// Finish reason reported when no frame supplied one
const DEFAULT_FINISH_REASON: &str = "stop";

/// How the upstream stream ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEnd {
    /// A `data: [DONE]` frame was read; later bytes were not consumed
    Terminator,
    /// The body ended without a terminator frame
    Eof,
    /// Reading the body failed; the response holds the partial result
    Error(String),
}

/// Outcome of aggregating one upstream stream
#[derive(Debug, Clone)]
pub struct Aggregated {
    /// Completion built from the accumulated frames
    pub response: CompletionResponse,
    /// Why consumption stopped
    pub end: StreamEnd,
    /// Number of data frames merged into the response
    pub frames: usize,
}

/// Consume an upstream event stream and fold it into a single completion
///
/// The stream is owned by this call and dropped before it returns, so the
/// underlying connection is released on every exit path.
pub async fn aggregate<S, B, E>(stream: S) -> Aggregated
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    let mut stream = std::pin::pin!(stream);
    let mut lines = LineBuffer::default();
    let mut accumulator = StreamAccumulator::default();

    let end = 'read: loop {
        match stream.next().await {
            Some(Ok(chunk)) => {
                lines.extend(chunk.as_ref());
                while let Some(line) = lines.next_line() {
                    if accumulator.ingest_line(&line) == Progress::Done {
                        break 'read StreamEnd::Terminator;
                    }
                }
            }
            Some(Err(e)) => break StreamEnd::Error(e.to_string()),
            None => {
                if !lines.is_empty() {
                    tracing::debug!(bytes = lines.pending_len(), "discarding unterminated trailing frame");
                }
                break StreamEnd::Eof;
            }
        }
    };

    let frames = accumulator.frames;
    Aggregated {
        response: accumulator.finish(),
        end,
        frames,
    }
}

/// Reassembles newline-terminated lines across chunk boundaries
///
/// Works on bytes so that a multi-byte UTF-8 sequence split between two
/// chunks is decoded only once the whole line has arrived. Lines are read
/// from a cursor and consumed bytes are compacted away once per chunk, so a
/// chunk holding many lines is split in linear time.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
    cursor: usize,
}

impl LineBuffer {
    /// Append a chunk of body bytes
    pub fn extend(&mut self, chunk: &[u8]) {
        if self.cursor > 0 {
            self.pending.drain(..self.cursor);
            self.cursor = 0;
        }
        self.pending.extend_from_slice(chunk);
    }

    /// Take the next complete line, without its `\n`
    pub fn next_line(&mut self) -> Option<String> {
        let unread = &self.pending[self.cursor..];
        let newline = unread.iter().position(|&b| b == b'\n')?;
        let line = String::from_utf8_lossy(&unread[..newline]).into_owned();
        self.cursor += newline + 1;
        Some(line)
    }

    /// Bytes of the unterminated fragment being held
    pub fn pending_len(&self) -> usize {
        self.pending.len() - self.cursor
    }

    /// Whether an unterminated fragment is being held
    pub fn is_empty(&self) -> bool {
        self.pending_len() == 0
    }
}

/// Whether aggregation should keep reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Keep reading frames
    Continue,
    /// Terminator seen, stop reading
    Done,
}

/// Mutable aggregation state for one upstream stream
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    id: Option<String>,
    created: Option<u64>,
    model: Option<String>,
    text: String,
    finish_reason: Option<String>,
    frames: usize,
}

impl StreamAccumulator {
    /// Process one line of the event stream
    pub fn ingest_line(&mut self, line: &str) -> Progress {
        let Some(payload) = line.trim().strip_prefix("data:") else {
            return Progress::Continue;
        };
        let payload = payload.trim();

        if payload == DONE_MARKER {
            return Progress::Done;
        }

        match serde_json::from_str::<Value>(payload) {
            Ok(frame) => self.apply(&frame),
            Err(e) => tracing::debug!(error = %e, data = %payload, "skipping unparseable stream frame"),
        }

        Progress::Continue
    }

    /// Merge one parsed frame into the accumulated state
    pub fn apply(&mut self, frame: &Value) {
        self.frames += 1;

        if self.id.is_none() {
            self.id = non_empty_str(frame.get("id"));
        }
        if self.created.is_none() {
            self.created = frame.get("created").and_then(Value::as_u64).filter(|&c| c != 0);
        }
        if self.model.is_none() {
            self.model = non_empty_str(frame.get("model"));
        }

        let choice = frame.pointer("/choices/0");

        if let Some(content) = choice.and_then(|c| c.pointer("/delta/content")).and_then(Value::as_str) {
            self.text.push_str(content);
        }

        if let Some(reason) = non_empty_str(choice.and_then(|c| c.get("finish_reason"))) {
            self.finish_reason = Some(reason);
        }
    }

    /// Text accumulated so far
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Build the final response, filling defaults for anything never observed
    pub fn finish(self) -> CompletionResponse {
        CompletionResponse {
            id: self.id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            object: ChatCompletionObject::ChatCompletion,
            created: self.created.unwrap_or_else(unix_now),
            model: self.model.unwrap_or_default(),
            choices: vec![Choice {
                index: 0,
                message: ChoiceMessage::assistant(self.text),
                finish_reason: self
                    .finish_reason
                    .unwrap_or_else(|| DEFAULT_FINISH_REASON.to_owned()),
            }],
        }
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
