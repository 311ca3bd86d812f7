use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{SequenceNumber, SubjectId};

/// Separator between the sequence prefix and the subject in an [`EventId`] wire string.
pub const ID_SEPARATOR: char = '_';

/// Version of the metadata block stamped on every persisted event.
pub const METADATA_VERSION: u32 = 1;

/// CloudEvents spec version stamped on every persisted event.
pub const SPEC_VERSION: &str = "1.0";

/// Content type stamped on every persisted event.
pub const CONTENT_TYPE: &str = "json";

/// Trait for domain events.
///
/// Domain events are immutable facts produced by command handlers. They are
/// usually an enum serialized adjacently tagged (`#[serde(tag = "type", content = "data")]`)
/// so the discriminator and payload land in the `type`/`data` fields of the envelope.
pub trait DomainEvent: Serialize + Send + Sync + Clone + 'static {
    /// Returns the event type discriminator.
    fn event_type(&self) -> &'static str;
}

/// Reasons an event identifier string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventIdError {
    #[error("event id `{0}` is missing the `_` separator")]
    MissingSeparator(String),

    #[error("event id `{0}` does not start with a positive sequence number")]
    InvalidSequence(String),

    #[error("event id `{0}` has an empty subject")]
    EmptySubject(String),
}

/// Identifier of a persisted event: its sequence within a subject plus the subject.
///
/// Ordering compares the sequence first, then the subject. On the wire the id
/// is the string `"{sequence}_{subject}"`, which is unique across subjects and
/// whose numeric prefix is cheap to parse.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EventId {
    sequence: SequenceNumber,
    subject: SubjectId,
}

impl EventId {
    /// Creates an event id from its parts.
    pub fn new(sequence: SequenceNumber, subject: SubjectId) -> Self {
        Self { sequence, subject }
    }

    /// The position of the event within its subject.
    pub fn sequence(&self) -> SequenceNumber {
        self.sequence
    }

    /// The subject the event belongs to.
    pub fn subject(&self) -> &SubjectId {
        &self.subject
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.sequence, ID_SEPARATOR, self.subject)
    }
}

impl FromStr for EventId {
    type Err = EventIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, subject) = s
            .split_once(ID_SEPARATOR)
            .ok_or_else(|| EventIdError::MissingSeparator(s.to_string()))?;

        let sequence = prefix
            .parse::<u64>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| EventIdError::InvalidSequence(s.to_string()))?;

        if subject.is_empty() {
            return Err(EventIdError::EmptySubject(s.to_string()));
        }

        Ok(Self {
            sequence: SequenceNumber::new(sequence),
            subject: SubjectId::from(subject),
        })
    }
}

impl TryFrom<String> for EventId {
    type Error = EventIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EventId> for String {
    fn from(id: EventId) -> Self {
        id.to_string()
    }
}

/// What a persisted record represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// An event internal to the service that produced it.
    PrivateEvent,
    /// An event forwarded to downstream consumers.
    PublicEvent,
    /// State of a named projection.
    NamedProjection,
    /// State of a global projection.
    GlobalProjection,
    /// State of an aggregate.
    AggregateSnapshot,
}

/// Library metadata block carried by every persisted event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    pub version: u32,
    pub kind: EventKind,
}

impl EventMetadata {
    /// Metadata for an event internal to the producing service.
    pub fn private() -> Self {
        Self {
            version: METADATA_VERSION,
            kind: EventKind::PrivateEvent,
        }
    }
}

/// A domain event enriched with everything needed to store and publish it.
///
/// Serialized, the domain event's `type`/`data` fields sit alongside the
/// envelope fields, CloudEvents style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedEvent<E> {
    /// The domain event (discriminator plus payload).
    #[serde(flatten)]
    pub event: E,

    /// The subject this event belongs to.
    pub subject: SubjectId,

    /// Sequence-ordered identifier.
    pub id: EventId,

    /// When the event was sequenced.
    pub time: DateTime<Utc>,

    pub datacontenttype: String,

    pub specversion: String,

    /// Name of the service that produced the event.
    pub source: String,

    pub metadata: EventMetadata,
}

impl<E> PersistedEvent<E> {
    /// The event's position within its subject.
    pub fn sequence(&self) -> SequenceNumber {
        self.id.sequence()
    }

    /// Re-tags the event as public, for publishers forwarding the full envelope.
    pub fn into_public(mut self) -> Self {
        self.metadata.kind = EventKind::PublicEvent;
        self
    }
}

impl<E: DomainEvent> PersistedEvent<E> {
    /// The domain event's type discriminator.
    pub fn event_type(&self) -> &'static str {
        self.event.event_type()
    }
}
