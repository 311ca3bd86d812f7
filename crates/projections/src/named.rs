//! Per-subject projections.

use common::WorkflowResult;
use domain::{Apply, SnapshotPolicy, read_stream};
use event_store::{EventStore, StreamKey, SubjectId};
use serde::{Serialize, de::DeserializeOwned};

use crate::ProjectionOptions;

/// A view over the events of a single subject, e.g. the history of one
/// product.
///
/// Snapshots are keyed by projection name and subject, so they never mix
/// with the aggregate's own snapshots for that subject.
pub struct NamedProjection<P, S> {
    store: S,
    name: String,
    default_state: P,
    policy: SnapshotPolicy,
}

impl<P, S> NamedProjection<P, S>
where
    S: EventStore,
    P: Apply<S::Event> + Clone + Serialize + DeserializeOwned + Send + Sync,
{
    pub fn new(options: ProjectionOptions<P>, store: S) -> Self {
        Self {
            store,
            name: options.projection_name,
            default_state: options.default_state,
            policy: SnapshotPolicy::new(options.snapshot),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reads the projection for `subject`.
    ///
    /// # Errors
    ///
    /// `Persistance` if the store cannot load the subject's events,
    /// `Projection` if a stored snapshot cannot be decoded.
    #[tracing::instrument(skip_all, fields(projection = %self.name, subject = %subject))]
    pub async fn get(&self, subject: &SubjectId) -> WorkflowResult<P> {
        let stream = StreamKey::named(self.name.clone(), subject.clone());
        read_stream(&self.store, &stream, &self.default_state, &self.policy).await
    }
}

impl<P, S> std::fmt::Debug for NamedProjection<P, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamedProjection")
            .field("name", &self.name)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
