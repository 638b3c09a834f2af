//! Pure fold of stream events into an assistant message.
//!
//! Each event addresses one part by its creation-order index; an index not
//! yet materialized gets a part of the implied discriminant first. The fold
//! is deliberately lenient: regressed tool transitions, wrong-discriminant
//! events, and unknown discriminants are absorbed without touching the
//! model, so retransmissions and protocol evolution never corrupt UI state.

use tracing::debug;

use crate::protocol::StreamEvent;
use crate::session::message::{Message, Part, ToolState};

/// Inert slot used when the stream skips ahead; keeps positional identity
/// stable for later parts.
const GAP_SLOT: &str = "gap";

/// Applies one part-bearing event to the in-progress assistant message.
///
/// Terminal events (`done`, `error`) and `Unknown` are handled by the
/// status machine and are no-ops here.
pub(crate) fn apply(message: &mut Message, event: &StreamEvent) {
    match event {
        StreamEvent::TextDelta { index, delta } => {
            match part_at(message, *index, || Part::Text {
                text: String::new(),
            }) {
                Part::Text { text } => text.push_str(delta),
                other => absorb("text-delta", *index, other),
            }
        }
        StreamEvent::ToolStart { index, tool_name } => {
            match part_at(message, *index, || Part::tool(tool_name.clone())) {
                Part::Tool { state, .. } => {
                    if *state != ToolState::InputStreaming {
                        debug!(index, "duplicate tool-start for advanced part dropped");
                    }
                }
                other => absorb("tool-start", *index, other),
            }
        }
        StreamEvent::ToolInputDelta { index, delta } => {
            match part_at(message, *index, || Part::tool(String::new())) {
                Part::Tool {
                    state, input_json, ..
                } => {
                    if *state == ToolState::InputStreaming {
                        input_json.push_str(delta);
                    } else {
                        debug!(index, "late tool-input fragment dropped");
                    }
                }
                other => absorb("tool-input", *index, other),
            }
        }
        StreamEvent::ToolInputReady { index, input } => {
            match part_at(message, *index, || Part::tool(String::new())) {
                Part::Tool {
                    state,
                    input: slot,
                    ..
                } => {
                    if state.rank() < ToolState::InputAvailable.rank() {
                        *slot = Some(input.clone());
                        *state = ToolState::InputAvailable;
                    } else {
                        debug!(index, "tool input already finalized, event dropped");
                    }
                }
                other => absorb("tool-input", *index, other),
            }
        }
        StreamEvent::ToolResult { index, output } => {
            match part_at(message, *index, || Part::tool(String::new())) {
                Part::Tool {
                    state,
                    output: slot,
                    ..
                } => {
                    if state.rank() < ToolState::OutputAvailable.rank() {
                        *slot = Some(output.clone());
                        *state = ToolState::OutputAvailable;
                    } else {
                        debug!(index, "tool already terminal, result dropped");
                    }
                }
                other => absorb("tool-result", *index, other),
            }
        }
        StreamEvent::ToolError { index, message: reason } => {
            match part_at(message, *index, || Part::tool(String::new())) {
                Part::Tool {
                    state,
                    error: slot,
                    ..
                } => {
                    if !state.is_terminal() {
                        *slot = Some(reason.clone());
                        *state = ToolState::OutputError;
                    } else {
                        debug!(index, "tool already terminal, error dropped");
                    }
                }
                other => absorb("tool-error", *index, other),
            }
        }
        StreamEvent::Data {
            index,
            subtype,
            payload,
        } => {
            let materialized = message.parts.len() <= *index;
            let part = part_at(message, *index, || Part::Data {
                subtype: subtype.clone(),
                payload: payload.clone(),
            });
            match part {
                // Data parts arrive whole; the payload is set exactly once.
                Part::Data { .. } => {
                    if !materialized {
                        debug!(index, subtype = %subtype, "repeated data event dropped");
                    }
                }
                other => absorb("data", *index, other),
            }
        }
        StreamEvent::Done | StreamEvent::StreamError { .. } => {}
        StreamEvent::Unknown { event_type } => {
            debug!(event_type = %event_type, "unknown stream event dropped");
        }
    }
}

/// Returns the part at `index`, materializing it (and any gap slots before
/// it) on first touch.
fn part_at(message: &mut Message, index: usize, make: impl FnOnce() -> Part) -> &mut Part {
    while message.parts.len() < index {
        message.parts.push(Part::Other {
            event_type: GAP_SLOT.to_string(),
        });
    }
    if message.parts.len() == index {
        message.parts.push(make());
    }
    &mut message.parts[index]
}

/// An event aimed at a part of a different discriminant is dropped; a
/// part's discriminant never changes after creation.
fn absorb(event: &str, index: usize, part: &Part) {
    debug!(event, index, part = part.kind(), "event for mismatched part dropped");
}
