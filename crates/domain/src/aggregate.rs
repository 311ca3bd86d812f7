//! Core aggregate and event-application traits.

use event_store::{DomainEvent, PersistedEvent};
use serde::{Serialize, de::DeserializeOwned};

/// Folds one persisted event into a state value.
///
/// Implemented by aggregates for their own events and by projections for the
/// events they read. `apply` must be pure and total: the same state and event
/// always produce the same next state, and it never fails (events are facts).
/// Match exhaustively on the event enum so a new variant is a compile error
/// until every state handles it.
pub trait Apply<E>: Sized {
    fn apply(self, event: &PersistedEvent<E>) -> Self;
}

/// Trait for aggregates in an event-sourced system.
///
/// The implementing type is the aggregate's state. It is rebuilt by folding
/// its events over a default value or a snapshot, and commands against it are
/// decided by a [`CommandHandler`](crate::CommandHandler).
///
/// State must round-trip through JSON so it can be snapshotted.
pub trait Aggregate:
    Apply<Self::Event> + Clone + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// The commands this aggregate accepts.
    type Command: Send + 'static;

    /// The events this aggregate produces and consumes.
    type Event: DomainEvent;

    /// Command rejection error.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the aggregate type name, used in logs.
    fn aggregate_type() -> &'static str;
}
