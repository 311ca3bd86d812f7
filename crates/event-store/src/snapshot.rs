use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{EventKind, SequenceNumber, StreamKey};

/// A cached state checkpoint for a stream.
///
/// `last_considered` is the sequence of the last event folded into `state`
/// when the snapshot was taken; only events after it need replaying. A
/// snapshot is used as a baseline only when its `version` matches the
/// version the reader expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// The stream this snapshot belongs to.
    pub stream: StreamKey,

    /// The serialized state.
    pub state: serde_json::Value,

    /// Sequence of the last event folded into `state`.
    pub last_considered: SequenceNumber,

    /// Schema version of the state.
    pub version: u32,

    /// Aggregate, named projection or global projection snapshot.
    pub kind: EventKind,

    /// When the snapshot was taken.
    pub taken_at: DateTime<Utc>,
}

impl Snapshot {
    /// Creates a new snapshot from already-serialized state.
    pub fn new(
        stream: StreamKey,
        last_considered: SequenceNumber,
        version: u32,
        state: serde_json::Value,
    ) -> Self {
        Self {
            kind: stream.snapshot_kind(),
            stream,
            state,
            last_considered,
            version,
            taken_at: Utc::now(),
        }
    }

    /// Creates a snapshot from a serializable state.
    pub fn from_state<T: Serialize>(
        stream: StreamKey,
        last_considered: SequenceNumber,
        version: u32,
        state: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::new(
            stream,
            last_considered,
            version,
            serde_json::to_value(state)?,
        ))
    }

    /// Deserializes the snapshot state into a concrete type.
    pub fn into_state<T: DeserializeOwned>(self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.state)
    }

    /// Deserializes a copy of the snapshot state.
    pub fn state_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.state)
    }
}
