//! Publishing collaborator contract and an in-memory outbox.

use std::sync::Arc;

use async_trait::async_trait;
use common::WorkflowError;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::PersistedEvent;

/// Error returned by a publisher that could not deliver events.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("publish failed: {0}")]
pub struct PublishError(pub String);

impl From<PublishError> for WorkflowError {
    fn from(err: PublishError) -> Self {
        WorkflowError::Publishing(err.0)
    }
}

/// Delivers newly persisted events to downstream consumers.
///
/// Called once per successful command with the resulting state and the events
/// that command produced. Implementations should forward the whole envelope
/// and are expected to use an outbox for at-most-once delivery; the core
/// neither retries nor deduplicates.
#[async_trait]
pub trait EventPublisher<S, E>: Send + Sync
where
    S: Send + Sync,
    E: Send + Sync + 'static,
{
    async fn publish(
        &self,
        state: &S,
        events: &[PersistedEvent<E>],
    ) -> Result<(), PublishError>;
}

/// Publisher that records every envelope it is handed, re-tagged as public.
pub struct InMemoryOutbox<E> {
    published: Arc<RwLock<Vec<PersistedEvent<E>>>>,
}

impl<E> Clone for InMemoryOutbox<E> {
    fn clone(&self) -> Self {
        Self {
            published: Arc::clone(&self.published),
        }
    }
}

impl<E> Default for InMemoryOutbox<E> {
    fn default() -> Self {
        Self {
            published: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl<E: Clone> InMemoryOutbox<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything published so far, in publish order.
    pub async fn published(&self) -> Vec<PersistedEvent<E>> {
        self.published.read().await.clone()
    }

    pub async fn published_count(&self) -> usize {
        self.published.read().await.len()
    }
}

#[async_trait]
impl<S, E> EventPublisher<S, E> for InMemoryOutbox<E>
where
    S: Send + Sync,
    E: Clone + Send + Sync + 'static,
{
    async fn publish(
        &self,
        _state: &S,
        events: &[PersistedEvent<E>],
    ) -> Result<(), PublishError> {
        let mut outbox = self.published.write().await;
        outbox.extend(events.iter().cloned().map(PersistedEvent::into_public));
        Ok(())
    }
}
