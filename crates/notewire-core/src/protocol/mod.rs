//! Wire protocol for the answering service's event stream.
//!
//! The backend streams one JSON object per SSE `data:` line, discriminated
//! by `"type"`. Each event addresses exactly one part of the in-progress
//! assistant message by its creation-order index. Unknown discriminants map
//! to [`StreamEvent::Unknown`] so the protocol can evolve without breaking
//! older clients.

mod sse;

use futures_util::stream::BoxStream;
use serde::Deserialize;
use serde_json::Value;

pub use sse::SseParser;

use crate::error::{TransportError, TransportResult};

/// Boxed stream of parsed wire events.
pub type ResponseStream = BoxStream<'static, TransportResult<StreamEvent>>;

/// One discrete unit delivered by the backend for the current turn.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Append a text fragment to the text part at `index`.
    TextDelta { index: usize, delta: String },
    /// A tool invocation has started; its input is still streaming.
    ToolStart { index: usize, tool_name: String },
    /// Raw fragment of the tool input still being streamed.
    ToolInputDelta { index: usize, delta: String },
    /// The tool input is fully received.
    ToolInputReady { index: usize, input: Value },
    /// The tool produced output.
    ToolResult { index: usize, output: Value },
    /// The tool failed; the turn itself continues.
    ToolError { index: usize, message: String },
    /// Structured side-channel payload, delivered whole.
    Data {
        index: usize,
        subtype: String,
        payload: Value,
    },
    /// Terminal event for the turn.
    Done,
    /// Terminal event signaling the whole request failed after send.
    StreamError { detail: String },
    /// Forward-compatibility catch-all; dropped by the reducer.
    Unknown { event_type: String },
}

// === Wire payload structures ===

#[derive(Debug, Deserialize)]
struct WireTextDelta {
    index: usize,
    delta: String,
}

#[derive(Debug, Deserialize)]
struct WireToolStart {
    index: usize,
    #[serde(rename = "toolName")]
    tool_name: String,
}

#[derive(Debug, Deserialize)]
struct WireToolInput {
    index: usize,
    #[serde(default)]
    delta: Option<String>,
    #[serde(default)]
    input: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct WireToolResult {
    index: usize,
    output: Value,
}

#[derive(Debug, Deserialize)]
struct WireToolError {
    index: usize,
    #[serde(rename = "errorText")]
    error_text: String,
}

#[derive(Debug, Deserialize)]
struct WireData {
    index: usize,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
struct WireStreamError {
    #[serde(rename = "errorText", default)]
    error_text: Option<String>,
}

fn decode<'a, T: Deserialize<'a>>(event_type: &str, data: &'a str) -> TransportResult<T> {
    serde_json::from_str(data)
        .map_err(|err| TransportError::parse(format!("Failed to parse {event_type}: {err}")))
}

/// Parses one SSE data payload into a [`StreamEvent`].
///
/// # Errors
/// Returns a parse error when a known event type carries a malformed body.
pub(crate) fn parse_event(data: &str) -> TransportResult<StreamEvent> {
    let value: Value = serde_json::from_str(data)
        .map_err(|err| TransportError::parse(format!("Malformed stream event: {err}")))?;
    let event_type = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| TransportError::parse("Stream event has no type"))?;

    match event_type {
        "text-delta" => {
            let parsed: WireTextDelta = decode(event_type, data)?;
            Ok(StreamEvent::TextDelta {
                index: parsed.index,
                delta: parsed.delta,
            })
        }
        "tool-start" => {
            let parsed: WireToolStart = decode(event_type, data)?;
            Ok(StreamEvent::ToolStart {
                index: parsed.index,
                tool_name: parsed.tool_name,
            })
        }
        "tool-input" => {
            let parsed: WireToolInput = decode(event_type, data)?;
            match parsed.input {
                Some(input) => Ok(StreamEvent::ToolInputReady {
                    index: parsed.index,
                    input,
                }),
                None => Ok(StreamEvent::ToolInputDelta {
                    index: parsed.index,
                    delta: parsed.delta.unwrap_or_default(),
                }),
            }
        }
        "tool-result" => {
            let parsed: WireToolResult = decode(event_type, data)?;
            Ok(StreamEvent::ToolResult {
                index: parsed.index,
                output: parsed.output,
            })
        }
        "tool-error" => {
            let parsed: WireToolError = decode(event_type, data)?;
            Ok(StreamEvent::ToolError {
                index: parsed.index,
                message: parsed.error_text,
            })
        }
        // The upstream adapter also emits "finish" for turn completion.
        "done" | "finish" => Ok(StreamEvent::Done),
        "error" => {
            let parsed: WireStreamError = decode(event_type, data)?;
            Ok(StreamEvent::StreamError {
                detail: parsed
                    .error_text
                    .unwrap_or_else(|| "stream failed".to_string()),
            })
        }
        other => {
            if let Some(subtype) = other.strip_prefix("data-") {
                let parsed: WireData = decode(other, data)?;
                return Ok(StreamEvent::Data {
                    index: parsed.index,
                    subtype: subtype.to_string(),
                    payload: parsed.data,
                });
            }
            Ok(StreamEvent::Unknown {
                event_type: other.to_string(),
            })
        }
    }
}
