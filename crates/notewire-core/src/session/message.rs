//! Message, part, and attachment model for one conversation.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Stable identifier correlating all turns of one conversation.
///
/// Generated once at controller creation and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(String);

impl ThreadId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ThreadId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in the conversation history.
///
/// User messages are complete at creation; assistant messages grow part by
/// part while the stream is live. Part order is append-only and reflects
/// arrival order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Message {
    /// Creates a complete user message with a single text part.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: new_message_id(),
            role: Role::User,
            parts: vec![Part::Text { text: text.into() }],
        }
    }

    /// Creates an empty assistant message to be filled by the reducer.
    pub fn assistant() -> Self {
        Self {
            id: new_message_id(),
            role: Role::Assistant,
            parts: Vec::new(),
        }
    }

    /// Concatenated text content of all text parts.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

fn new_message_id() -> String {
    format!("msg_{}", Uuid::new_v4().simple())
}

/// Tool invocation lifecycle.
///
/// Advances monotonically; regressions are absorbed by the reducer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolState {
    InputStreaming,
    InputAvailable,
    OutputAvailable,
    OutputError,
}

impl ToolState {
    /// Position in the lifecycle; both terminal states share the top rank.
    pub(crate) fn rank(self) -> u8 {
        match self {
            ToolState::InputStreaming => 0,
            ToolState::InputAvailable => 1,
            ToolState::OutputAvailable | ToolState::OutputError => 2,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.rank() == 2
    }
}

/// Smallest typed unit of message content.
///
/// A part's discriminant never changes after creation; only its fields
/// mutate (text grows, tool state advances, data payload is set once).
/// Identity within a message is positional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Part {
    Text {
        text: String,
    },
    Tool {
        tool_name: String,
        state: ToolState,
        /// Raw input fragments accumulated while streaming.
        #[serde(default, skip_serializing_if = "String::is_empty")]
        input_json: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        input: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        output: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    Data {
        subtype: String,
        payload: Value,
    },
    Other {
        event_type: String,
    },
}

impl Part {
    pub(crate) fn tool(tool_name: impl Into<String>) -> Self {
        Part::Tool {
            tool_name: tool_name.into(),
            state: ToolState::InputStreaming,
            input_json: String::new(),
            input: None,
            output: None,
            error: None,
        }
    }

    /// Discriminant name for logging.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Part::Text { .. } => "text",
            Part::Tool { .. } => "tool",
            Part::Data { .. } => "data",
            Part::Other { .. } => "other",
        }
    }
}

/// File staged for the next outgoing message.
///
/// The `url` is the content reference; staged files travel as data URLs,
/// matching what the indexing backend expects to download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    #[serde(rename = "mediaType")]
    pub media_type: String,
    pub url: String,
}

impl Attachment {
    pub fn new(
        name: impl Into<String>,
        media_type: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            url: url.into(),
        }
    }

    /// Encodes raw bytes into a data-URL attachment.
    pub fn from_bytes(name: impl Into<String>, media_type: &str, bytes: &[u8]) -> Self {
        let url = format!("data:{media_type};base64,{}", BASE64.encode(bytes));
        Self {
            name: name.into(),
            media_type: media_type.to_string(),
            url,
        }
    }

    /// Whether the backend indexes this media type (PDF only, today).
    pub fn is_supported_media_type(media_type: &str) -> bool {
        media_type.eq_ignore_ascii_case("application/pdf")
    }
}
