//! Decides when a fresh snapshot is written.

use common::{SnapshotConfig, WorkflowResult};
use event_store::{EventStore, EventStoreError, SequenceNumber, Snapshot, StreamKey};
use serde::Serialize;

/// Snapshot policy built from an optional [`SnapshotConfig`].
///
/// Without a config snapshotting is disabled and every evaluation is a no-op.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotPolicy {
    config: Option<SnapshotConfig>,
}

impl SnapshotPolicy {
    pub fn new(config: Option<SnapshotConfig>) -> Self {
        Self { config }
    }

    pub fn disabled() -> Self {
        Self { config: None }
    }

    /// The snapshot version readers expect, `None` when snapshotting is disabled.
    pub fn expected_version(&self) -> Option<u32> {
        self.config.map(|c| c.version)
    }

    /// True when at least `frequency` events were applied since the last snapshot.
    pub fn is_due(&self, last_applied: SequenceNumber, last_snapshot: SequenceNumber) -> bool {
        self.config
            .is_some_and(|c| last_applied.distance_from(last_snapshot) >= c.frequency)
    }

    /// Writes a snapshot of `state` through `store` when one is due.
    ///
    /// A failed write is returned as a `Persistance` failure; it never affects
    /// the state the caller already computed.
    pub async fn maybe_snapshot<S, St>(
        &self,
        store: &St,
        stream: &StreamKey,
        state: &S,
        last_applied: SequenceNumber,
        last_snapshot: SequenceNumber,
    ) -> WorkflowResult<()>
    where
        S: Serialize + Sync,
        St: EventStore + ?Sized,
    {
        let Some(config) = self.config else {
            return Ok(());
        };
        if !self.is_due(last_applied, last_snapshot) {
            return Ok(());
        }

        let snapshot = Snapshot::from_state(stream.clone(), last_applied, config.version, state)
            .map_err(EventStoreError::from)?;
        store.save_snapshot(snapshot).await?;

        metrics::counter!("snapshots_written_total").increment(1);
        tracing::info!(
            %stream,
            %last_applied,
            version = config.version,
            "snapshot written"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Stage;
    use event_store::{InMemoryEventStore, PersistedBundle, PersistedEvent, SubjectId};
    use std::collections::BTreeMap;

    struct BrokenSnapshotStore;

    #[async_trait::async_trait]
    impl EventStore for BrokenSnapshotStore {
        type Event = u64;

        async fn append(&self, _events: Vec<PersistedEvent<u64>>) -> event_store::Result<()> {
            Ok(())
        }

        async fn load(
            &self,
            stream: &StreamKey,
            _snapshot_version: Option<u32>,
        ) -> event_store::Result<PersistedBundle<u64>> {
            Ok(PersistedBundle::empty(stream.clone()))
        }

        async fn save_snapshot(&self, _snapshot: Snapshot) -> event_store::Result<()> {
            Err(EventStoreError::Unavailable("disk full".to_string()))
        }
    }

    fn policy(frequency: u64, version: u32) -> SnapshotPolicy {
        SnapshotPolicy::new(Some(SnapshotConfig::new(frequency, version).unwrap()))
    }

    fn stream() -> StreamKey {
        StreamKey::aggregate(SubjectId::from("1"))
    }

    #[test]
    fn due_exactly_at_frequency() {
        let policy = policy(4, 1);
        let base = SequenceNumber::BASELINE;
        assert!(!policy.is_due(SequenceNumber::new(4), base));
        assert!(policy.is_due(SequenceNumber::new(5), base));
        assert!(policy.is_due(SequenceNumber::new(9), SequenceNumber::new(5)));
    }

    #[test]
    fn never_due_without_config() {
        let policy = SnapshotPolicy::disabled();
        assert!(!policy.is_due(SequenceNumber::new(1000), SequenceNumber::BASELINE));
        assert_eq!(policy.expected_version(), None);
    }

    #[tokio::test]
    async fn writes_snapshot_when_due() {
        let store: InMemoryEventStore<u64> = InMemoryEventStore::new();
        policy(4, 3)
            .maybe_snapshot(
                &store,
                &stream(),
                &vec![1, 2, 3],
                SequenceNumber::new(5),
                SequenceNumber::BASELINE,
            )
            .await
            .unwrap();

        let snapshots = store.snapshots().await;
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].last_considered, SequenceNumber::new(5));
        assert_eq!(snapshots[0].version, 3);
        assert_eq!(snapshots[0].state, serde_json::json!([1, 2, 3]));
    }

    #[tokio::test]
    async fn skips_snapshot_when_not_due() {
        let store: InMemoryEventStore<u64> = InMemoryEventStore::new();
        policy(4, 1)
            .maybe_snapshot(
                &store,
                &stream(),
                &0u8,
                SequenceNumber::new(4),
                SequenceNumber::BASELINE,
            )
            .await
            .unwrap();

        assert_eq!(store.snapshot_count().await, 0);
    }

    #[tokio::test]
    async fn disabled_policy_is_a_noop() {
        let store: InMemoryEventStore<u64> = InMemoryEventStore::new();
        SnapshotPolicy::disabled()
            .maybe_snapshot(
                &store,
                &stream(),
                &0u8,
                SequenceNumber::new(100),
                SequenceNumber::BASELINE,
            )
            .await
            .unwrap();

        assert_eq!(store.snapshot_count().await, 0);
    }

    #[tokio::test]
    async fn write_failure_is_reported_as_persistence() {
        let result = policy(1, 1)
            .maybe_snapshot(
                &BrokenSnapshotStore,
                &stream(),
                &0u8,
                SequenceNumber::new(3),
                SequenceNumber::BASELINE,
            )
            .await;

        assert_eq!(result.unwrap_err().stage(), Stage::Persistance);
    }

    #[tokio::test]
    async fn unserializable_state_is_a_serialization_failure() {
        let store: InMemoryEventStore<u64> = InMemoryEventStore::new();
        let state: BTreeMap<Vec<u8>, u8> = BTreeMap::from([(vec![1, 2], 3)]);

        let err = policy(1, 1)
            .maybe_snapshot(
                &store,
                &stream(),
                &state,
                SequenceNumber::new(3),
                SequenceNumber::BASELINE,
            )
            .await
            .unwrap_err();

        assert_eq!(err.stage(), Stage::Persistance);
        assert!(err.message().starts_with("Serialization error"));
        assert_eq!(store.snapshot_count().await, 0);
    }
}
