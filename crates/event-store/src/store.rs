use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{EventKind, EventStoreError, PersistedEvent, Result, Snapshot, SubjectId};

/// Identifies the event stream a read or snapshot refers to.
///
/// Aggregates and named projections read the events of a single subject;
/// global projections read every event. Snapshots are keyed by the whole
/// `StreamKey`, so an aggregate and a named projection over the same subject
/// keep separate snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum StreamKey {
    Aggregate { subject: SubjectId },
    Named { projection: String, subject: SubjectId },
    Global { projection: String },
}

impl StreamKey {
    pub fn aggregate(subject: SubjectId) -> Self {
        StreamKey::Aggregate { subject }
    }

    pub fn named(projection: impl Into<String>, subject: SubjectId) -> Self {
        StreamKey::Named {
            projection: projection.into(),
            subject,
        }
    }

    pub fn global(projection: impl Into<String>) -> Self {
        StreamKey::Global {
            projection: projection.into(),
        }
    }

    /// The subject whose events this stream reads, `None` for global streams.
    pub fn subject(&self) -> Option<&SubjectId> {
        match self {
            StreamKey::Aggregate { subject } | StreamKey::Named { subject, .. } => Some(subject),
            StreamKey::Global { .. } => None,
        }
    }

    /// The kind tag stamped on snapshots of this stream.
    pub fn snapshot_kind(&self) -> EventKind {
        match self {
            StreamKey::Aggregate { .. } => EventKind::AggregateSnapshot,
            StreamKey::Named { .. } => EventKind::NamedProjection,
            StreamKey::Global { .. } => EventKind::GlobalProjection,
        }
    }
}

impl std::fmt::Display for StreamKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamKey::Aggregate { subject } => write!(f, "aggregate/{subject}"),
            StreamKey::Named {
                projection,
                subject,
            } => write!(f, "{projection}/{subject}"),
            StreamKey::Global { projection } => f.write_str(projection),
        }
    }
}

/// What a persistence collaborator returns for a read: the latest usable
/// snapshot, if any, plus the events recorded after it in ascending order.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedBundle<E> {
    pub stream: StreamKey,
    pub snapshot: Option<Snapshot>,
    pub events: Vec<PersistedEvent<E>>,
}

impl<E> PersistedBundle<E> {
    /// A bundle with no snapshot and no events.
    pub fn empty(stream: StreamKey) -> Self {
        Self {
            stream,
            snapshot: None,
            events: Vec::new(),
        }
    }
}

/// Persistence collaborator contract.
///
/// Implementations must make per-subject `append` atomic and either serialize
/// or reject batches whose sequence numbers collide with stored events; the
/// core does no locking of its own.
///
/// `load` receives the snapshot version the caller expects. A snapshot whose
/// version differs (or any snapshot, when no version is given) must not be
/// returned, and in that case the bundle carries every event of the stream.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// The domain event type stored.
    type Event: Send + Sync + 'static;

    /// Appends events in the order given, atomically.
    async fn append(&self, events: Vec<PersistedEvent<Self::Event>>) -> Result<()>;

    /// Loads the latest matching snapshot and the events after it.
    async fn load(
        &self,
        stream: &StreamKey,
        snapshot_version: Option<u32>,
    ) -> Result<PersistedBundle<Self::Event>>;

    /// Stores a snapshot. Later snapshots supersede earlier ones.
    async fn save_snapshot(&self, snapshot: Snapshot) -> Result<()>;
}

#[async_trait]
impl<T> EventStore for Arc<T>
where
    T: EventStore + ?Sized,
{
    type Event = T::Event;

    async fn append(&self, events: Vec<PersistedEvent<Self::Event>>) -> Result<()> {
        (**self).append(events).await
    }

    async fn load(
        &self,
        stream: &StreamKey,
        snapshot_version: Option<u32>,
    ) -> Result<PersistedBundle<Self::Event>> {
        (**self).load(stream, snapshot_version).await
    }

    async fn save_snapshot(&self, snapshot: Snapshot) -> Result<()> {
        (**self).save_snapshot(snapshot).await
    }
}

/// Validates a batch before appending: non-empty, a single subject, and
/// consecutive sequence numbers.
pub fn validate_events_for_append<E>(events: &[PersistedEvent<E>]) -> Result<()> {
    let Some(first) = events.first() else {
        return Err(EventStoreError::InvalidAppend(
            "Cannot append empty event list".to_string(),
        ));
    };

    let mut expected = first.sequence();
    for event in events.iter().skip(1) {
        if event.subject != first.subject {
            return Err(EventStoreError::InvalidAppend(
                "All events must be for the same subject".to_string(),
            ));
        }
        expected = expected.next();
        if event.sequence() != expected {
            return Err(EventStoreError::InvalidAppend(format!(
                "Event sequences must be consecutive. Expected {}, got {}",
                expected,
                event.sequence()
            )));
        }
    }

    if events.iter().any(|e| e.id.subject() != &e.subject) {
        return Err(EventStoreError::InvalidAppend(
            "Event id subject does not match event subject".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EventId, EventMetadata, SequenceNumber};

    fn event(subject: &str, sequence: u64) -> PersistedEvent<serde_json::Value> {
        PersistedEvent {
            event: serde_json::json!({"type": "thingHappened", "data": null}),
            subject: SubjectId::from(subject),
            id: EventId::new(SequenceNumber::new(sequence), SubjectId::from(subject)),
            time: chrono::Utc::now(),
            datacontenttype: "json".to_string(),
            specversion: "1.0".to_string(),
            source: "tests".to_string(),
            metadata: EventMetadata::private(),
        }
    }

    #[test]
    fn rejects_empty_batch() {
        let events: Vec<PersistedEvent<serde_json::Value>> = vec![];
        assert!(matches!(
            validate_events_for_append(&events),
            Err(EventStoreError::InvalidAppend(_))
        ));
    }

    #[test]
    fn rejects_mixed_subjects() {
        let events = vec![event("1", 2), event("2", 3)];
        assert!(validate_events_for_append(&events).is_err());
    }

    #[test]
    fn rejects_gaps_in_sequence() {
        let events = vec![event("1", 2), event("1", 4)];
        assert!(validate_events_for_append(&events).is_err());
    }

    #[test]
    fn accepts_consecutive_batch() {
        let events = vec![event("1", 2), event("1", 3), event("1", 4)];
        assert!(validate_events_for_append(&events).is_ok());
    }

    #[test]
    fn stream_key_subject_and_kind() {
        let named = StreamKey::named("History", SubjectId::from("1"));
        assert_eq!(named.subject(), Some(&SubjectId::from("1")));
        assert_eq!(named.snapshot_kind(), EventKind::NamedProjection);
        assert_eq!(named.to_string(), "History/1");

        let global = StreamKey::global("PriceChanges");
        assert_eq!(global.subject(), None);
        assert_eq!(global.to_string(), "PriceChanges");
    }
}
