//! Session status machine over the message list.
//!
//! One consumer per controller; the single in-flight turn invariant is the
//! concurrency control, so nothing here needs locking.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TransportError;
use crate::protocol::StreamEvent;
use crate::session::message::Message;
use crate::session::reducer;

/// Session status for the single active controller instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Ready for the next submission.
    #[default]
    Idle,
    /// Request sent, no event received yet.
    Submitted,
    /// Events arriving for the current turn.
    Streaming,
    /// The turn failed; surfaced as a notice, then reset to idle.
    Error,
}

/// Reduces stream events into the message list and drives session status.
#[derive(Debug, Default)]
pub struct StreamConsumer {
    messages: Vec<Message>,
    status: SessionStatus,
    /// Index of the in-flight assistant message, once materialized.
    active: Option<usize>,
}

impl StreamConsumer {
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_idle(&self) -> bool {
        self.status == SessionStatus::Idle
    }

    /// Appends the user message and moves idle -> submitted.
    pub(crate) fn begin_turn(&mut self, user: Message) {
        self.messages.push(user);
        self.status = SessionStatus::Submitted;
        self.active = None;
    }

    /// Applies one stream event in arrival order.
    ///
    /// Returns the failure to surface when the event is a terminal stream
    /// error; every other event is absorbed here.
    pub(crate) fn apply_event(&mut self, event: &StreamEvent) -> Option<TransportError> {
        if !matches!(
            self.status,
            SessionStatus::Submitted | SessionStatus::Streaming
        ) {
            debug!(status = ?self.status, "stream event outside an active turn dropped");
            return None;
        }

        // Receipt of the first event moves submitted -> streaming.
        self.status = SessionStatus::Streaming;

        match event {
            StreamEvent::Done => {
                self.status = SessionStatus::Idle;
                self.active = None;
                None
            }
            StreamEvent::StreamError { detail } => {
                self.status = SessionStatus::Error;
                self.active = None;
                Some(TransportError::stream(detail.clone()))
            }
            StreamEvent::Unknown { event_type } => {
                debug!(event_type = %event_type, "unknown stream event dropped");
                None
            }
            part_event => {
                let index = self.ensure_assistant();
                reducer::apply(&mut self.messages[index], part_event);
                None
            }
        }
    }

    /// Marks the turn failed after a transport-level error.
    pub(crate) fn apply_failure(&mut self) {
        self.status = SessionStatus::Error;
        self.active = None;
    }

    /// Resets error -> idle once the failure has been surfaced.
    pub(crate) fn acknowledge_error(&mut self) {
        if self.status == SessionStatus::Error {
            self.status = SessionStatus::Idle;
        }
    }

    /// The assistant message is created lazily, when the stream first
    /// produces output for the turn.
    fn ensure_assistant(&mut self) -> usize {
        if let Some(index) = self.active {
            index
        } else {
            self.messages.push(Message::assistant());
            let index = self.messages.len() - 1;
            self.active = Some(index);
            index
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::session::message::{Part, Role, ToolState};

    fn text_delta(index: usize, delta: &str) -> StreamEvent {
        StreamEvent::TextDelta {
            index,
            delta: delta.to_string(),
        }
    }

    #[test]
    fn full_text_turn_reaches_idle_with_one_assistant_message() {
        let mut consumer = StreamConsumer::default();
        consumer.begin_turn(Message::user("Summarize my notes"));
        assert_eq!(consumer.status(), SessionStatus::Submitted);

        for event in [
            text_delta(0, "The "),
            text_delta(0, "notes "),
            text_delta(0, "cover X."),
        ] {
            assert!(consumer.apply_event(&event).is_none());
            assert_eq!(consumer.status(), SessionStatus::Streaming);
        }
        assert!(consumer.apply_event(&StreamEvent::Done).is_none());

        assert_eq!(consumer.status(), SessionStatus::Idle);
        assert_eq!(consumer.messages().len(), 2);
        assert_eq!(consumer.messages()[0].role, Role::User);
        let assistant = &consumer.messages()[1];
        assert_eq!(assistant.role, Role::Assistant);
        assert_eq!(assistant.text(), "The notes cover X.");
    }

    #[test]
    fn tool_turn_reaches_output_available() {
        let mut consumer = StreamConsumer::default();
        consumer.begin_turn(Message::user("look this up"));
        for event in [
            StreamEvent::ToolStart {
                index: 0,
                tool_name: "search".to_string(),
            },
            StreamEvent::ToolInputReady {
                index: 0,
                input: json!({"q": "x"}),
            },
            StreamEvent::ToolResult {
                index: 0,
                output: json!({"hits": 3}),
            },
            StreamEvent::Done,
        ] {
            consumer.apply_event(&event);
        }

        assert_eq!(consumer.status(), SessionStatus::Idle);
        let Part::Tool { state, output, .. } = &consumer.messages()[1].parts[0] else {
            panic!("expected tool part");
        };
        assert_eq!(*state, ToolState::OutputAvailable);
        assert_eq!(output.as_ref().unwrap(), &json!({"hits": 3}));
    }

    #[test]
    fn stream_error_moves_to_error_and_returns_the_failure() {
        let mut consumer = StreamConsumer::default();
        consumer.begin_turn(Message::user("hi"));
        let err = consumer
            .apply_event(&StreamEvent::StreamError {
                detail: "graph exploded".to_string(),
            })
            .expect("stream error must surface");
        assert_eq!(err.message, "graph exploded");
        assert_eq!(consumer.status(), SessionStatus::Error);

        consumer.acknowledge_error();
        assert_eq!(consumer.status(), SessionStatus::Idle);
    }

    #[test]
    fn unknown_first_event_still_starts_streaming() {
        let mut consumer = StreamConsumer::default();
        consumer.begin_turn(Message::user("hi"));
        consumer.apply_event(&StreamEvent::Unknown {
            event_type: "start-step".to_string(),
        });
        assert_eq!(consumer.status(), SessionStatus::Streaming);
        // No assistant message until a part-bearing event arrives.
        assert_eq!(consumer.messages().len(), 1);
    }

    #[test]
    fn events_after_done_are_dropped() {
        let mut consumer = StreamConsumer::default();
        consumer.begin_turn(Message::user("hi"));
        consumer.apply_event(&text_delta(0, "answer"));
        consumer.apply_event(&StreamEvent::Done);

        let before = serde_json::to_string(consumer.messages()).unwrap();
        consumer.apply_event(&text_delta(0, " ghost"));
        assert_eq!(consumer.status(), SessionStatus::Idle);
        assert_eq!(serde_json::to_string(consumer.messages()).unwrap(), before);
    }

    #[test]
    fn transport_failure_keeps_the_user_message() {
        let mut consumer = StreamConsumer::default();
        consumer.begin_turn(Message::user("hi"));
        consumer.apply_failure();
        assert_eq!(consumer.status(), SessionStatus::Error);
        consumer.acknowledge_error();

        // User message stays; no assistant message was added.
        assert_eq!(consumer.messages().len(), 1);
        assert_eq!(consumer.messages()[0].role, Role::User);
    }
}
