//! Persistence and publishing collaborators for the event-sourcing core.
//!
//! The core never talks to storage directly; it goes through the
//! [`EventStore`] and [`EventPublisher`] contracts defined here. The crate also
//! ships in-memory implementations of both for tests and embedding.

pub mod error;
pub mod event;
pub mod memory;
pub mod publish;
pub mod snapshot;
pub mod store;

pub use common::{SequenceNumber, SubjectId};
pub use error::{EventStoreError, Result};
pub use event::{
    CONTENT_TYPE, DomainEvent, EventId, EventIdError, EventKind, EventMetadata, ID_SEPARATOR,
    METADATA_VERSION, PersistedEvent, SPEC_VERSION,
};
pub use memory::InMemoryEventStore;
pub use publish::{EventPublisher, InMemoryOutbox, PublishError};
pub use snapshot::Snapshot;
pub use store::{EventStore, PersistedBundle, StreamKey, validate_events_for_append};
