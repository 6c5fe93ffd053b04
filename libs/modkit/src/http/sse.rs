use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt};
use serde::Serialize;
use std::{borrow::Cow, convert::Infallible, time::Duration};
use tokio::sync::broadcast;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};

const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Small typed broadcaster built on `tokio::sync::broadcast`.
/// - T must be `Clone` so multiple subscribers can receive the same payload.
/// - The channel is bounded: lagging subscribers lose the oldest messages.
#[derive(Clone)]
pub struct SseBroadcaster<T> {
    tx: broadcast::Sender<T>,
}

impl<T: Clone + Send + 'static> SseBroadcaster<T> {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Broadcast to current subscribers; having none is not an error.
    pub fn send(&self, value: T) {
        let _ = self.tx.send(value);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Subscribe to a typed stream that reports lag: `Err(skipped)` stands in
    /// for the messages this subscriber lost by falling behind.
    pub fn subscribe_with_lag(&self) -> impl Stream<Item = Result<T, u64>> + Send + 'static {
        BroadcastStream::new(self.tx.subscribe()).map(|res| {
            res.map_err(|BroadcastStreamRecvError::Lagged(skipped)| {
                tracing::debug!(skipped, "broadcast subscriber lagged");
                skipped
            })
        })
    }

    /// Subscribe to a typed stream; lag errors are logged and skipped.
    pub fn subscribe_stream(&self) -> impl Stream<Item = T> + Send + 'static {
        BroadcastStream::new(self.tx.subscribe()).filter_map(|res| async move {
            match res {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::debug!(error = %e, "broadcast subscriber lagged");
                    None
                }
            }
        })
    }
}

/// Render any typed stream as SSE with JSON payloads, a constant `event:` name
/// and periodic keepalive comments.
pub fn sse_stream_response<S, T>(
    stream: S,
    event_name: impl Into<Cow<'static, str>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
    S: Stream<Item = T> + Send + 'static,
    T: Serialize,
{
    let event_name = event_name.into();
    let events = stream.map(move |msg| {
        let ev = Event::default()
            .event(event_name.as_ref())
            .json_data(&msg)
            .unwrap_or_else(|_| {
                Event::default()
                    .event(event_name.as_ref())
                    .data("serialization_error")
            });
        Ok(ev)
    });
    Sse::new(events).keep_alive(KeepAlive::new().interval(KEEPALIVE_INTERVAL).text("keepalive"))
}
