use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    EventStoreError, PersistedBundle, PersistedEvent, Result, SequenceNumber, Snapshot, StreamKey,
    SubjectId,
    store::{EventStore, validate_events_for_append},
};

/// In-memory event store implementation for testing and embedding.
///
/// Appends for a subject are serialized by the write lock and a batch that
/// would reuse an existing sequence number is rejected, so concurrent writers
/// computing the same next sequence cannot both succeed.
pub struct InMemoryEventStore<E> {
    events: Arc<RwLock<Vec<PersistedEvent<E>>>>,
    snapshots: Arc<RwLock<Vec<Snapshot>>>,
}

impl<E> Clone for InMemoryEventStore<E> {
    fn clone(&self) -> Self {
        Self {
            events: Arc::clone(&self.events),
            snapshots: Arc::clone(&self.snapshots),
        }
    }
}

impl<E> Default for InMemoryEventStore<E> {
    fn default() -> Self {
        Self {
            events: Arc::new(RwLock::new(Vec::new())),
            snapshots: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl<E: Clone> InMemoryEventStore<E> {
    /// Creates a new empty in-memory event store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of events stored.
    pub async fn event_count(&self) -> usize {
        self.events.read().await.len()
    }

    /// Returns every stored event in insertion order.
    pub async fn all_events(&self) -> Vec<PersistedEvent<E>> {
        self.events.read().await.clone()
    }

    /// Returns the events of one subject in sequence order.
    pub async fn events_for(&self, subject: &SubjectId) -> Vec<PersistedEvent<E>> {
        let store = self.events.read().await;
        let mut events: Vec<_> = store
            .iter()
            .filter(|e| &e.subject == subject)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.sequence());
        events
    }

    /// Returns the number of snapshots written.
    pub async fn snapshot_count(&self) -> usize {
        self.snapshots.read().await.len()
    }

    /// Returns every snapshot written, oldest first.
    pub async fn snapshots(&self) -> Vec<Snapshot> {
        self.snapshots.read().await.clone()
    }

    /// Inserts events as-is, bypassing append validation. Intended for fixtures.
    pub async fn seed_events(&self, events: impl IntoIterator<Item = PersistedEvent<E>>) {
        self.events.write().await.extend(events);
    }

    /// Inserts a snapshot as-is. Intended for fixtures.
    pub async fn seed_snapshot(&self, snapshot: Snapshot) {
        self.snapshots.write().await.push(snapshot);
    }

    /// Clears all events and snapshots.
    pub async fn clear(&self) {
        self.events.write().await.clear();
        self.snapshots.write().await.clear();
    }
}

#[async_trait]
impl<E> EventStore for InMemoryEventStore<E>
where
    E: Clone + Send + Sync + 'static,
{
    type Event = E;

    async fn append(&self, events: Vec<PersistedEvent<E>>) -> Result<()> {
        validate_events_for_append(&events)?;

        let subject = events[0].subject.clone();
        let attempted = events[0].sequence();

        let mut store = self.events.write().await;

        let current = store
            .iter()
            .filter(|e| e.subject == subject)
            .map(|e| e.sequence())
            .max();

        if let Some(current) = current
            && attempted <= current
        {
            return Err(EventStoreError::SequenceConflict {
                subject,
                attempted,
                current,
            });
        }

        tracing::debug!(%subject, count = events.len(), "appending events");
        store.extend(events);

        Ok(())
    }

    async fn load(
        &self,
        stream: &StreamKey,
        snapshot_version: Option<u32>,
    ) -> Result<PersistedBundle<E>> {
        let snapshot = match snapshot_version {
            Some(version) => self
                .snapshots
                .read()
                .await
                .iter()
                .rev()
                .find(|s| &s.stream == stream && s.version == version)
                .cloned(),
            None => None,
        };

        let after = snapshot
            .as_ref()
            .map(|s| s.last_considered)
            .unwrap_or(SequenceNumber::new(0));

        let store = self.events.read().await;
        let mut events: Vec<_> = store
            .iter()
            .filter(|e| stream.subject().is_none_or(|subject| &e.subject == subject))
            .filter(|e| e.sequence() > after)
            .cloned()
            .collect();

        // Global streams keep insertion order across subjects.
        if stream.subject().is_some() {
            events.sort_by_key(|e| e.sequence());
        }

        Ok(PersistedBundle {
            stream: stream.clone(),
            snapshot,
            events,
        })
    }

    async fn save_snapshot(&self, snapshot: Snapshot) -> Result<()> {
        tracing::debug!(
            stream = %snapshot.stream,
            last_considered = %snapshot.last_considered,
            version = snapshot.version,
            "saving snapshot"
        );
        self.snapshots.write().await.push(snapshot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EventId, EventMetadata};

    type TestEvent = serde_json::Value;

    fn create_test_event(subject: &str, sequence: u64) -> PersistedEvent<TestEvent> {
        PersistedEvent {
            event: serde_json::json!({"type": "thingHappened", "data": sequence}),
            subject: SubjectId::from(subject),
            id: EventId::new(SequenceNumber::new(sequence), SubjectId::from(subject)),
            time: chrono::Utc::now(),
            datacontenttype: "json".to_string(),
            specversion: "1.0".to_string(),
            source: "tests".to_string(),
            metadata: EventMetadata::private(),
        }
    }

    fn subject_stream(subject: &str) -> StreamKey {
        StreamKey::aggregate(SubjectId::from(subject))
    }

    #[tokio::test]
    async fn append_single_event() {
        let store = InMemoryEventStore::new();
        store.append(vec![create_test_event("1", 2)]).await.unwrap();

        assert_eq!(store.event_count().await, 1);
    }

    #[tokio::test]
    async fn append_multiple_events() {
        let store = InMemoryEventStore::new();
        store
            .append(vec![
                create_test_event("1", 2),
                create_test_event("1", 3),
                create_test_event("1", 4),
            ])
            .await
            .unwrap();

        let events = store.events_for(&SubjectId::from("1")).await;
        assert_eq!(events.len(), 3);
        assert_eq!(events[2].sequence(), SequenceNumber::new(4));
    }

    #[tokio::test]
    async fn colliding_append_is_rejected() {
        let store = InMemoryEventStore::new();
        store.append(vec![create_test_event("1", 2)]).await.unwrap();

        let result = store.append(vec![create_test_event("1", 2)]).await;

        assert!(matches!(
            result,
            Err(EventStoreError::SequenceConflict { attempted, current, .. })
                if attempted == SequenceNumber::new(2) && current == SequenceNumber::new(2)
        ));
        assert_eq!(store.event_count().await, 1);
    }

    #[tokio::test]
    async fn sequences_are_independent_per_subject() {
        let store = InMemoryEventStore::new();
        store.append(vec![create_test_event("1", 2)]).await.unwrap();
        store.append(vec![create_test_event("2", 2)]).await.unwrap();

        assert_eq!(store.event_count().await, 2);
    }

    #[tokio::test]
    async fn load_without_snapshot_returns_all_subject_events() {
        let store = InMemoryEventStore::new();
        store
            .append(vec![create_test_event("1", 2), create_test_event("1", 3)])
            .await
            .unwrap();
        store.append(vec![create_test_event("2", 2)]).await.unwrap();

        let bundle = store.load(&subject_stream("1"), Some(1)).await.unwrap();

        assert!(bundle.snapshot.is_none());
        assert_eq!(bundle.events.len(), 2);
    }

    #[tokio::test]
    async fn load_with_matching_snapshot_returns_only_later_events() {
        let store = InMemoryEventStore::new();
        store
            .append(vec![
                create_test_event("1", 2),
                create_test_event("1", 3),
                create_test_event("1", 4),
            ])
            .await
            .unwrap();
        store
            .save_snapshot(Snapshot::new(
                subject_stream("1"),
                SequenceNumber::new(3),
                1,
                serde_json::json!({}),
            ))
            .await
            .unwrap();

        let bundle = store.load(&subject_stream("1"), Some(1)).await.unwrap();

        assert_eq!(
            bundle.snapshot.map(|s| s.last_considered),
            Some(SequenceNumber::new(3))
        );
        assert_eq!(bundle.events.len(), 1);
        assert_eq!(bundle.events[0].sequence(), SequenceNumber::new(4));
    }

    #[tokio::test]
    async fn load_ignores_snapshot_of_other_version() {
        let store = InMemoryEventStore::new();
        store
            .append(vec![create_test_event("1", 2), create_test_event("1", 3)])
            .await
            .unwrap();
        store
            .save_snapshot(Snapshot::new(
                subject_stream("1"),
                SequenceNumber::new(3),
                2,
                serde_json::json!({}),
            ))
            .await
            .unwrap();

        let bundle = store.load(&subject_stream("1"), Some(1)).await.unwrap();
        assert!(bundle.snapshot.is_none());
        assert_eq!(bundle.events.len(), 2);

        let bundle = store.load(&subject_stream("1"), None).await.unwrap();
        assert!(bundle.snapshot.is_none());
        assert_eq!(bundle.events.len(), 2);
    }

    #[tokio::test]
    async fn latest_snapshot_supersedes_earlier_ones() {
        let store: InMemoryEventStore<TestEvent> = InMemoryEventStore::new();
        for last in [3, 7] {
            store
                .save_snapshot(Snapshot::new(
                    subject_stream("1"),
                    SequenceNumber::new(last),
                    1,
                    serde_json::json!({}),
                ))
                .await
                .unwrap();
        }

        let bundle = store.load(&subject_stream("1"), Some(1)).await.unwrap();

        assert_eq!(store.snapshot_count().await, 2);
        assert_eq!(
            bundle.snapshot.map(|s| s.last_considered),
            Some(SequenceNumber::new(7))
        );
    }

    #[tokio::test]
    async fn snapshots_are_scoped_by_stream() {
        let store: InMemoryEventStore<TestEvent> = InMemoryEventStore::new();
        store
            .save_snapshot(Snapshot::new(
                StreamKey::named("History", SubjectId::from("1")),
                SequenceNumber::new(3),
                1,
                serde_json::json!({}),
            ))
            .await
            .unwrap();

        let bundle = store.load(&subject_stream("1"), Some(1)).await.unwrap();
        assert!(bundle.snapshot.is_none());
    }

    #[tokio::test]
    async fn global_load_reads_every_subject_in_insertion_order() {
        let store = InMemoryEventStore::new();
        store.append(vec![create_test_event("1", 2)]).await.unwrap();
        store.append(vec![create_test_event("2", 2)]).await.unwrap();
        store.append(vec![create_test_event("1", 3)]).await.unwrap();

        let bundle = store
            .load(&StreamKey::global("Everything"), None)
            .await
            .unwrap();

        let ids: Vec<String> = bundle.events.iter().map(|e| e.id.to_string()).collect();
        assert_eq!(ids, vec!["2_1", "2_2", "3_1"]);
    }

    #[tokio::test]
    async fn clear_removes_everything() {
        let store = InMemoryEventStore::new();
        store.append(vec![create_test_event("1", 2)]).await.unwrap();
        store
            .save_snapshot(Snapshot::new(
                subject_stream("1"),
                SequenceNumber::new(2),
                1,
                serde_json::json!({}),
            ))
            .await
            .unwrap();

        store.clear().await;

        assert_eq!(store.event_count().await, 0);
        assert_eq!(store.snapshot_count().await, 0);
    }
}
