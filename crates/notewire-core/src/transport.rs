//! Outbound request construction for the answering service.
//!
//! One fully-specified request per submission; the adapter holds no state
//! across calls beyond the connection pool inside `reqwest::Client`.

use futures_util::StreamExt;
use serde::Serialize;

use crate::error::{TransportError, TransportErrorKind};
use crate::protocol::{ResponseStream, SseParser};
use crate::session::message::{Attachment, ThreadId};

/// Standard User-Agent header for notewire API requests.
pub const USER_AGENT: &str = concat!("notewire/", env!("CARGO_PKG_VERSION"));

const CHAT_ROUTE: &str = "/api/chat";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    thread_id: &'a str,
    message: OutgoingMessage<'a>,
}

#[derive(Debug, Serialize)]
struct OutgoingMessage<'a> {
    text: &'a str,
    attachments: &'a [Attachment],
}

/// Builds and sends the streaming chat request.
pub struct TransportAdapter {
    http: reqwest::Client,
    endpoint: String,
}

impl TransportAdapter {
    /// Creates an adapter targeting the given endpoint base address.
    pub fn new(endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            endpoint,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends one turn and returns the event stream of the response.
    ///
    /// # Errors
    /// Connection and timeout failures are classified; non-success
    /// responses carry the backend's `detail` message when present.
    pub async fn send(
        &self,
        token: &str,
        thread: &ThreadId,
        text: &str,
        attachments: &[Attachment],
    ) -> Result<ResponseStream, TransportError> {
        let url = format!("{}{CHAT_ROUTE}", self.endpoint);
        let request = ChatRequest {
            thread_id: thread.as_str(),
            message: OutgoingMessage { text, attachments },
        };

        let response = self
            .http
            .post(&url)
            .header("accept", "text/event-stream")
            .header("user-agent", USER_AGENT)
            .bearer_auth(token)
            .json(&request)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::http_status(status.as_u16(), &body));
        }

        // Boxed so the SSE layer sees an Unpin byte stream.
        let bytes = response.bytes_stream().boxed();
        Ok(SseParser::new(bytes).boxed())
    }
}

fn classify_reqwest_error(e: &reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::timeout(format!("Request timed out: {e}"))
    } else if e.is_connect() {
        TransportError::timeout(format!("Connection failed: {e}"))
    } else {
        TransportError::new(TransportErrorKind::HttpStatus, format!("Network error: {e}"))
    }
}
