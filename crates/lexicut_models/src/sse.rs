//! Server-sent event decoding for streamed reasoning responses.
//!
//! The transport does not deliver whole lines per read, so the decoder keeps
//! the unfinished tail of each chunk and prepends it to the next one. An event
//! is dispatched once both an `event:` line and a `data:` line have been seen
//! since the previous dispatch. A blank line ends the record, so half a record
//! never pairs with the next one.

use futures_util::{Stream, StreamExt};
use lexicut_error::{LexicutResult, ModelsError, ModelsErrorKind};
use lexicut_interface::{StopReason, StreamEvent};
use serde::Deserialize;
use std::fmt::Display;
use tracing::{debug, error, trace};

/// One dispatched event: its name and raw data payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// Value of the `event:` line
    pub event: String,
    /// Value of the `data:` line(s)
    pub data: String,
}

/// Incremental line-oriented event decoder.
///
/// # Examples
///
/// ```
/// use lexicut_models::SseDecoder;
///
/// let mut decoder = SseDecoder::default();
/// assert!(decoder.push(b"event: ping\nda").is_empty());
/// let events = decoder.push(b"ta: {\"type\":\"ping\"}\n\n");
/// assert_eq!(events.len(), 1);
/// assert_eq!(events[0].event, "ping");
/// ```
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Option<String>,
}

impl SseDecoder {
    /// Feed one chunk of bytes and return every event it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\n', '\r']);
            events.extend(self.line(line));
        }
        events
    }

    /// Flush a final unterminated line once the stream has ended.
    pub fn finish(&mut self) -> Vec<SseEvent> {
        if self.buffer.is_empty() {
            return Vec::new();
        }
        let rest = std::mem::take(&mut self.buffer);
        let line = String::from_utf8_lossy(&rest);
        self.line(line.trim_end_matches('\r')).into_iter().collect()
    }

    fn line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            if self.event.is_some() || self.data.is_some() {
                debug!(
                    event = ?self.event,
                    has_data = self.data.is_some(),
                    "Dropping incomplete SSE record"
                );
            }
            self.event = None;
            self.data = None;
            return None;
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => match &mut self.data {
                Some(data) => {
                    data.push('\n');
                    data.push_str(value);
                }
                None => self.data = Some(value.to_string()),
            },
            other => trace!(field = other, "Ignoring SSE field"),
        }

        if self.event.is_some() && self.data.is_some() {
            let event = self.event.take().unwrap_or_default();
            let data = self.data.take().unwrap_or_default();
            return Some(SseEvent { event, data });
        }
        None
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireEvent {
    MessageStart {
        message: WireMessage,
    },
    ContentBlockStart {
        index: usize,
        content_block: WireBlock,
    },
    ContentBlockDelta {
        index: usize,
        delta: WireDelta,
    },
    ContentBlockStop {
        index: usize,
    },
    MessageDelta {
        delta: WireMessageDelta,
    },
    MessageStop,
    Ping,
    Error {
        error: WireError,
    },
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireBlock {
    Text,
    ToolUse { id: String, name: String },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireDelta {
    TextDelta { text: String },
    InputJsonDelta { partial_json: String },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Deserialize)]
struct WireMessageDelta {
    stop_reason: Option<StopReason>,
}

#[derive(Debug, Deserialize)]
struct WireError {
    #[serde(rename = "type")]
    kind: String,
    message: String,
}

/// Translate one dispatched event into a [`StreamEvent`].
///
/// Returns `Ok(None)` for events and blocks this engine does not use.
///
/// # Errors
///
/// Fails on an in-stream `error` event or a payload that is not valid JSON.
pub fn decode_event(event: &SseEvent) -> Result<Option<StreamEvent>, ModelsError> {
    let wire: WireEvent = match serde_json::from_str(&event.data) {
        Ok(wire) => wire,
        Err(e) => {
            // Unknown event types are skipped; malformed payloads are not.
            if serde_json::from_str::<serde_json::Value>(&event.data).is_ok() {
                debug!(event = %event.event, "Skipping unrecognized stream event");
                return Ok(None);
            }
            return Err(ModelsError::new(ModelsErrorKind::Parse(format!(
                "Invalid '{}' payload: {}",
                event.event, e
            ))));
        }
    };

    let decoded = match wire {
        WireEvent::MessageStart { message } => StreamEvent::MessageStart { id: message.id },
        WireEvent::ContentBlockStart {
            index,
            content_block,
        } => match content_block {
            WireBlock::Text => StreamEvent::TextStart { index },
            WireBlock::ToolUse { id, name } => StreamEvent::ToolUseStart { index, id, name },
            WireBlock::Unsupported => return Ok(None),
        },
        WireEvent::ContentBlockDelta { index, delta } => match delta {
            WireDelta::TextDelta { text } => StreamEvent::TextDelta { index, text },
            WireDelta::InputJsonDelta { partial_json } => {
                StreamEvent::InputJsonDelta {
                    index,
                    partial_json,
                }
            }
            WireDelta::Unsupported => return Ok(None),
        },
        WireEvent::ContentBlockStop { index } => StreamEvent::BlockStop { index },
        WireEvent::MessageDelta { delta } => StreamEvent::MessageDelta {
            stop_reason: delta.stop_reason,
        },
        WireEvent::MessageStop => StreamEvent::MessageStop,
        WireEvent::Ping => StreamEvent::Ping,
        WireEvent::Error { error: wire_error } => {
            error!(kind = %wire_error.kind, message = %wire_error.message, "Stream carried an error");
            let kind = match wire_error.kind.as_str() {
                "overloaded_error" | "rate_limit_error" => {
                    ModelsErrorKind::RateLimited(wire_error.message)
                }
                other => ModelsErrorKind::Stream(format!("{}: {}", other, wire_error.message)),
            };
            return Err(ModelsError::new(kind));
        }
    };

    Ok(Some(decoded))
}

/// Decode a byte stream into reasoning events.
///
/// A stream that ends without a single event is reported as a missing body.
pub fn decode_sse_stream<S, B, E>(bytes: S) -> impl Stream<Item = LexicutResult<StreamEvent>>
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send,
    E: Display + Send,
{
    async_stream::try_stream! {
        let mut decoder = SseDecoder::default();
        let mut seen = 0usize;
        let mut bytes = Box::pin(bytes);

        while let Some(chunk) = bytes.next().await {
            let chunk = chunk
                .map_err(|e| ModelsError::new(ModelsErrorKind::Stream(e.to_string())))?;
            for event in decoder.push(chunk.as_ref()) {
                seen += 1;
                if let Some(decoded) = decode_event(&event)? {
                    yield decoded;
                }
            }
        }

        for event in decoder.finish() {
            seen += 1;
            if let Some(decoded) = decode_event(&event)? {
                yield decoded;
            }
        }

        if seen == 0 {
            Err::<(), _>(ModelsError::new(ModelsErrorKind::MissingBody))?;
        }
    }
}
