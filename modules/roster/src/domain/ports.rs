use futures::stream::BoxStream;

/// Output port: publish domain events (no knowledge of transport).
pub trait EventPublisher<E>: Send + Sync + 'static {
    fn publish(&self, event: &E);
}

/// What a subscriber observes: an event, or the fact that it fell behind
/// and `skipped` events are gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification<E> {
    Event(E),
    Lagged { skipped: u64 },
}

/// Input port: observe domain events published after subscription.
pub trait EventSubscriber<E>: Send + Sync + 'static {
    fn subscribe(&self) -> BoxStream<'static, Notification<E>>;
}
