//! SSE parser that converts a response byte stream into wire events.

use std::pin::Pin;

use eventsource_stream::{EventStream, Eventsource};
use futures_util::Stream;
use tracing::debug;

use crate::error::{TransportError, TransportResult};
use crate::protocol::{StreamEvent, parse_event};

/// Sentinel the backend writes after the final event.
const DONE_SENTINEL: &str = "[DONE]";

/// Converts an SSE byte stream into [`StreamEvent`]s.
///
/// Ends the stream at the `[DONE]` sentinel; everything after it is
/// ignored. Byte-level stream failures surface as transport errors.
pub struct SseParser<S> {
    inner: EventStream<S>,
    terminated: bool,
}

impl<S> SseParser<S> {
    pub fn new(stream: S) -> Self
    where
        S: Eventsource,
    {
        Self {
            inner: stream.eventsource(),
            terminated: false,
        }
    }
}

impl<S, E> Stream for SseParser<S>
where
    S: Stream<Item = std::result::Result<bytes::Bytes, E>> + Unpin,
    E: std::error::Error + Send + Sync + 'static,
{
    type Item = TransportResult<StreamEvent>;

    fn poll_next(
        mut self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        use std::task::Poll;

        if self.terminated {
            return Poll::Ready(None);
        }

        loop {
            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(event))) => {
                    let data = event.data.trim();
                    if data.is_empty() {
                        continue;
                    }
                    if data == DONE_SENTINEL {
                        self.terminated = true;
                        return Poll::Ready(None);
                    }
                    return Poll::Ready(Some(parse_event(data)));
                }
                Poll::Ready(Some(Err(e))) => {
                    debug!("SSE byte stream error: {e}");
                    return Poll::Ready(Some(Err(TransportError::parse(format!(
                        "SSE stream error: {e}"
                    )))));
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
