//! Session controller: the façade presentation layers talk to.
//!
//! Owns the thread identity, the message list, the draft, the staged
//! attachment set, and submission gating. One in-flight turn per thread;
//! while the session is not idle, submissions are refused.

use std::sync::Arc;

use futures_util::StreamExt;
use tracing::{debug, error, warn};

use crate::auth::CredentialSupplier;
use crate::config::Config;
use crate::error::{TransportError, TransportResult};
use crate::protocol::{ResponseStream, StreamEvent};
use crate::session::consumer::{SessionStatus, StreamConsumer};
use crate::session::message::{Attachment, Message, ThreadId};
use crate::transport::TransportAdapter;

/// Dismissible, non-blocking notification for transport failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
}

/// Outcome of a submission attempt.
///
/// The refusal variants are gating conditions, not errors: nothing was
/// sent and no state changed.
pub enum Submission {
    /// The turn is live; pump the stream to completion.
    Accepted(TurnStream),
    /// Draft trimmed to empty.
    EmptyDraft,
    /// A turn is already in flight.
    Busy,
    /// The credential supplier has no active identity.
    NoIdentity,
    /// The request failed at send time; a notice was surfaced.
    Failed,
}

impl Submission {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Submission::Accepted(_))
    }
}

/// Pull-based handle for one live turn.
///
/// The embedding runtime pumps events one at a time and feeds them back to
/// the controller; dropping the handle aborts the underlying read without
/// touching session state.
pub struct TurnStream {
    inner: ResponseStream,
}

impl TurnStream {
    /// Pulls the next event; `None` when the transport closes the stream.
    pub async fn next_event(&mut self) -> Option<TransportResult<StreamEvent>> {
        self.inner.next().await
    }
}

/// Top-level conversation state holder.
pub struct SessionController {
    thread: ThreadId,
    draft: String,
    staged: Vec<Attachment>,
    consumer: StreamConsumer,
    transport: TransportAdapter,
    credentials: Arc<dyn CredentialSupplier>,
    audience: String,
    notices: Vec<Notice>,
}

impl SessionController {
    /// Creates a controller with a fresh thread identity.
    pub fn new(config: &Config, credentials: Arc<dyn CredentialSupplier>) -> Self {
        Self {
            thread: ThreadId::new(),
            draft: String::new(),
            staged: Vec::new(),
            consumer: StreamConsumer::default(),
            transport: TransportAdapter::new(&config.endpoint),
            credentials,
            audience: config.audience.clone(),
            notices: Vec::new(),
        }
    }

    pub fn thread(&self) -> &ThreadId {
        &self.thread
    }

    pub fn status(&self) -> SessionStatus {
        self.consumer.status()
    }

    pub fn messages(&self) -> &[Message] {
        self.consumer.messages()
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn dismiss_notice(&mut self, index: usize) {
        if index < self.notices.len() {
            self.notices.remove(index);
        }
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn staged_attachments(&self) -> &[Attachment] {
        &self.staged
    }

    /// Stages a file for the next submission.
    ///
    /// Returns false (and stages nothing) for media types the backend does
    /// not index; rejecting here keeps the submission from failing
    /// server-side for a reason the client already knew.
    pub fn stage_attachment(&mut self, attachment: Attachment) -> bool {
        if !Attachment::is_supported_media_type(&attachment.media_type) {
            warn!(media_type = %attachment.media_type, "unsupported attachment rejected");
            return false;
        }
        self.staged.push(attachment);
        true
    }

    /// Submits the text with the staged attachment set.
    ///
    /// Gating, in order: whitespace-only text, a turn already in flight,
    /// and credential resolution. All three refuse silently with no state
    /// change. On acceptance the user message is appended immediately, the
    /// draft and staging set are cleared, and the turn stream is returned.
    pub async fn submit(&mut self, text: &str) -> Submission {
        self.submit_inner(text, true).await
    }

    /// Submits a suggestion chip: identical to [`submit`](Self::submit)
    /// with no attachments. First-turn affordance only; the gate on the
    /// message list being empty lives in the presentation layer.
    pub async fn submit_suggestion(&mut self, text: &str) -> Submission {
        self.submit_inner(text, false).await
    }

    async fn submit_inner(&mut self, text: &str, with_attachments: bool) -> Submission {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Submission::EmptyDraft;
        }
        if !self.consumer.is_idle() {
            debug!(status = ?self.status(), "submission refused while a turn is in flight");
            return Submission::Busy;
        }

        // Re-resolved on every submission; tokens are never cached so
        // rotation and expiry are tolerated.
        let token = match self.credentials.bearer_token(&self.audience).await {
            Ok(token) => token,
            Err(err) => {
                debug!(%err, "submission refused: no active identity");
                return Submission::NoIdentity;
            }
        };

        let attachments = if with_attachments {
            std::mem::take(&mut self.staged)
        } else {
            Vec::new()
        };
        self.draft.clear();
        self.consumer.begin_turn(Message::user(trimmed));

        match self
            .transport
            .send(&token, &self.thread, trimmed, &attachments)
            .await
        {
            Ok(stream) => Submission::Accepted(TurnStream { inner: stream }),
            Err(err) => {
                self.surface_failure(err);
                Submission::Failed
            }
        }
    }

    /// Feeds one pulled event back into the session.
    pub fn apply_event(&mut self, event: &StreamEvent) {
        if let Some(err) = self.consumer.apply_event(event) {
            self.surface_failure_notice(err);
        }
    }

    /// Records a transport-level failure for the current turn.
    pub fn apply_failure(&mut self, err: TransportError) {
        self.surface_failure(err);
    }

    /// Pumps a turn to completion, applying every event.
    ///
    /// Convenience for headless embedders; interactive shells usually pull
    /// via [`TurnStream::next_event`] so they can render between events.
    pub async fn drive(&mut self, mut turn: TurnStream) {
        while let Some(item) = turn.next_event().await {
            match item {
                Ok(event) => self.apply_event(&event),
                Err(err) => {
                    self.apply_failure(err);
                    return;
                }
            }
        }
        // The transport closed the stream without a terminal event.
        if !matches!(self.status(), SessionStatus::Idle) {
            self.apply_failure(TransportError::stream(
                "response stream ended before completion",
            ));
        }
    }

    fn surface_failure(&mut self, err: TransportError) {
        self.consumer.apply_failure();
        self.surface_failure_notice(err);
    }

    /// Error status is transient: the failure becomes a notice and the
    /// session returns to idle, ready for a retry.
    fn surface_failure_notice(&mut self, err: TransportError) {
        error!(kind = %err.kind, details = ?err.details, "turn failed: {err}");
        self.notices.push(Notice {
            text: err.message.clone(),
        });
        self.consumer.acknowledge_error();
    }
}
