//! Collaborators that fail on demand.

use async_trait::async_trait;
use event_store::{
    EventPublisher, EventStore, EventStoreError, InMemoryEventStore, PersistedBundle,
    PersistedEvent, PublishError, Snapshot, StreamKey,
};

/// Wraps an [`InMemoryEventStore`] and fails the selected operations with
/// [`EventStoreError::Unavailable`]. Operations not selected pass through.
#[derive(Clone)]
pub struct FailingEventStore<E> {
    inner: InMemoryEventStore<E>,
    fail_load: bool,
    fail_append: bool,
    fail_snapshot: bool,
}

impl<E: Clone> FailingEventStore<E> {
    pub fn new(inner: InMemoryEventStore<E>) -> Self {
        Self {
            inner,
            fail_load: false,
            fail_append: false,
            fail_snapshot: false,
        }
    }

    pub fn failing_load(mut self) -> Self {
        self.fail_load = true;
        self
    }

    pub fn failing_append(mut self) -> Self {
        self.fail_append = true;
        self
    }

    pub fn failing_snapshot(mut self) -> Self {
        self.fail_snapshot = true;
        self
    }

    /// The wrapped store, for inspecting what did get through.
    pub fn inner(&self) -> &InMemoryEventStore<E> {
        &self.inner
    }
}

#[async_trait]
impl<E> EventStore for FailingEventStore<E>
where
    E: Clone + Send + Sync + 'static,
{
    type Event = E;

    async fn append(&self, events: Vec<PersistedEvent<E>>) -> event_store::Result<()> {
        if self.fail_append {
            return Err(EventStoreError::Unavailable("append refused".to_string()));
        }
        self.inner.append(events).await
    }

    async fn load(
        &self,
        stream: &StreamKey,
        snapshot_version: Option<u32>,
    ) -> event_store::Result<PersistedBundle<E>> {
        if self.fail_load {
            return Err(EventStoreError::Unavailable("load refused".to_string()));
        }
        self.inner.load(stream, snapshot_version).await
    }

    async fn save_snapshot(&self, snapshot: Snapshot) -> event_store::Result<()> {
        if self.fail_snapshot {
            return Err(EventStoreError::Unavailable("snapshot refused".to_string()));
        }
        self.inner.save_snapshot(snapshot).await
    }
}

/// A publisher that rejects everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingPublisher;

#[async_trait]
impl<S, E> EventPublisher<S, E> for FailingPublisher
where
    S: Send + Sync,
    E: Send + Sync + 'static,
{
    async fn publish(
        &self,
        _state: &S,
        _events: &[PersistedEvent<E>],
    ) -> Result<(), PublishError> {
        Err(PublishError("broker unreachable".to_string()))
    }
}
