use common::WorkflowError;
use thiserror::Error;

use crate::{SequenceNumber, SubjectId};

/// Errors that can occur when interacting with the event store.
#[derive(Debug, Error)]
pub enum EventStoreError {
    /// An append collided with events already stored for the subject.
    /// Another writer appended first; nothing from this batch was stored.
    #[error(
        "Sequence conflict for subject {subject}: attempted to append at {attempted}, stream is already at {current}"
    )]
    SequenceConflict {
        subject: SubjectId,
        attempted: SequenceNumber,
        current: SequenceNumber,
    },

    /// The batch handed to `append` was malformed.
    #[error("Invalid append: {0}")]
    InvalidAppend(String),

    /// The backing storage could not be reached.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<EventStoreError> for WorkflowError {
    fn from(err: EventStoreError) -> Self {
        WorkflowError::Persistance(err.to_string())
    }
}

/// Result type for event store operations.
pub type Result<T> = std::result::Result<T, EventStoreError>;
