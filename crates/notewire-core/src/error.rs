//! Structured errors for the transport boundary.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Categories of transport errors for consistent handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportErrorKind {
    /// HTTP status error (4xx, 5xx)
    HttpStatus,
    /// Connection failure or request timeout
    Timeout,
    /// Failed to parse a stream envelope or event payload
    Parse,
    /// The stream itself reported failure (terminal `error` event)
    Stream,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportErrorKind::HttpStatus => write!(f, "http_status"),
            TransportErrorKind::Timeout => write!(f, "timeout"),
            TransportErrorKind::Parse => write!(f, "parse"),
            TransportErrorKind::Stream => write!(f, "stream"),
        }
    }
}

/// Structured transport failure with a display-ready message.
///
/// `message` is what the notice queue shows to the user; `details` keeps the
/// raw body around for logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportError {
    /// Error category
    pub kind: TransportErrorKind,
    /// One-line summary suitable for display
    pub message: String,
    /// Optional additional details (e.g., raw error body)
    pub details: Option<String>,
}

impl TransportError {
    /// Creates a new transport error.
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    /// Creates an HTTP status error, mining the backend's error envelope.
    ///
    /// The backend wraps failures as `{"detail": "..."}`. When the body
    /// parses, `detail` becomes the user-facing message; otherwise the
    /// message falls back to the bare status line.
    pub fn http_status(status: u16, body: &str) -> Self {
        if let Ok(json) = serde_json::from_str::<Value>(body)
            && let Some(detail) = json.get("detail").and_then(Value::as_str)
        {
            return Self {
                kind: TransportErrorKind::HttpStatus,
                message: detail.to_string(),
                details: Some(body.to_string()),
            };
        }
        Self {
            kind: TransportErrorKind::HttpStatus,
            message: format!("HTTP {status}"),
            details: (!body.is_empty()).then(|| body.to_string()),
        }
    }

    /// Creates a timeout/connection error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Timeout, message)
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Parse, message)
    }

    /// Creates an in-stream failure (terminal `error` event).
    pub fn stream(detail: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Stream, detail)
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for TransportError {}

/// Result type for transport operations.
pub type TransportResult<T> = std::result::Result<T, TransportError>;
