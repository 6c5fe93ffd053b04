use futures::stream::{BoxStream, StreamExt};
use modkit::SseBroadcaster;

use crate::domain::ports::{EventPublisher, EventSubscriber, Notification};

/// In-process event bus over a bounded broadcast channel. Subscribers that
/// fall behind lose the oldest events and get a `Notification::Lagged` instead.
#[derive(Clone)]
pub struct BroadcastEvents<E> {
    out: SseBroadcaster<E>,
}

impl<E: Clone + Send + 'static> BroadcastEvents<E> {
    pub fn new(capacity: usize) -> Self {
        Self {
            out: SseBroadcaster::new(capacity),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.out.subscriber_count()
    }
}

impl<E: Clone + Send + Sync + 'static> EventPublisher<E> for BroadcastEvents<E> {
    fn publish(&self, event: &E) {
        self.out.send(event.clone());
    }
}

impl<E: Clone + Send + Sync + 'static> EventSubscriber<E> for BroadcastEvents<E> {
    fn subscribe(&self) -> BoxStream<'static, Notification<E>> {
        self.out
            .subscribe_with_lag()
            .map(|item| match item {
                Ok(event) => Notification::Event(event),
                Err(skipped) => Notification::Lagged { skipped },
            })
            .boxed()
    }
}
