//! Assigns durable, order-preserving identifiers to new domain events.

use std::sync::Arc;

use common::{Clock, SystemClock};
use event_store::{
    CONTENT_TYPE, EventId, EventMetadata, PersistedBundle, PersistedEvent, SPEC_VERSION,
    SequenceNumber, SubjectId,
};

/// The sequence the next event of a stream must follow: the last event's
/// sequence, else the snapshot's, else [`SequenceNumber::BASELINE`].
pub fn last_known_sequence<E>(bundle: &PersistedBundle<E>) -> SequenceNumber {
    bundle
        .events
        .last()
        .map(PersistedEvent::sequence)
        .or_else(|| bundle.snapshot.as_ref().map(|s| s.last_considered))
        .unwrap_or(SequenceNumber::BASELINE)
}

/// The highest sequence folded into a state hydrated from `bundle`.
///
/// Equals [`last_known_sequence`] for single-subject streams. A global bundle
/// mixes subjects in insertion order, so its last event need not carry the
/// highest sequence.
pub fn last_folded_sequence<E>(bundle: &PersistedBundle<E>) -> SequenceNumber {
    bundle
        .events
        .iter()
        .map(PersistedEvent::sequence)
        .max()
        .or_else(|| bundle.snapshot.as_ref().map(|s| s.last_considered))
        .unwrap_or(SequenceNumber::BASELINE)
}

/// The sequence covered by the bundle's snapshot, or the baseline if there is none.
pub fn last_snapshot_sequence<E>(bundle: &PersistedBundle<E>) -> SequenceNumber {
    bundle
        .snapshot
        .as_ref()
        .map(|s| s.last_considered)
        .unwrap_or(SequenceNumber::BASELINE)
}

/// Turns domain events into persisted events for one subject.
///
/// Makes no concurrency guarantee: two callers starting from the same last
/// sequence produce colliding identifiers, and it is up to the store to
/// reject one of them.
#[derive(Clone)]
pub struct EventSequencer {
    source: String,
    clock: Arc<dyn Clock>,
}

impl EventSequencer {
    /// Creates a sequencer stamping events with `source` and the system time.
    pub fn new(source: impl Into<String>) -> Self {
        Self::with_clock(source, Arc::new(SystemClock))
    }

    pub fn with_clock(source: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            source: source.into(),
            clock,
        }
    }

    /// The service name stamped as `source`.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Sequences `events` after `last`: the i-th event (0-based) gets `last + 1 + i`.
    pub fn sequence<E>(
        &self,
        subject: &SubjectId,
        last: SequenceNumber,
        events: Vec<E>,
    ) -> Vec<PersistedEvent<E>> {
        let time = self.clock.now();
        let mut sequence = last;

        events
            .into_iter()
            .map(|event| {
                sequence = sequence.next();
                PersistedEvent {
                    event,
                    subject: subject.clone(),
                    id: EventId::new(sequence, subject.clone()),
                    time,
                    datacontenttype: CONTENT_TYPE.to_string(),
                    specversion: SPEC_VERSION.to_string(),
                    source: self.source.clone(),
                    metadata: EventMetadata::private(),
                }
            })
            .collect()
    }
}

impl std::fmt::Debug for EventSequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSequencer")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}
