//! Projections over every event in the store.

use common::WorkflowResult;
use domain::{Apply, SnapshotPolicy, read_stream};
use event_store::{EventStore, StreamKey};
use serde::{Serialize, de::DeserializeOwned};

use crate::ProjectionOptions;

/// A single, system-wide view such as an operational report.
///
/// Reads every stored event and keys its snapshots by projection name. It
/// holds no per-subject data and should not be used for it.
pub struct GlobalProjection<P, S> {
    store: S,
    stream: StreamKey,
    default_state: P,
    policy: SnapshotPolicy,
}

impl<P, S> GlobalProjection<P, S>
where
    S: EventStore,
    P: Apply<S::Event> + Clone + Serialize + DeserializeOwned + Send + Sync,
{
    pub fn new(options: ProjectionOptions<P>, store: S) -> Self {
        Self {
            store,
            stream: StreamKey::global(options.projection_name),
            default_state: options.default_state,
            policy: SnapshotPolicy::new(options.snapshot),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reads the projection.
    ///
    /// # Errors
    ///
    /// `Persistance` if the store cannot load the events,
    /// `Projection` if a stored snapshot cannot be decoded.
    #[tracing::instrument(skip_all, fields(projection = %self.stream))]
    pub async fn get(&self) -> WorkflowResult<P> {
        read_stream(&self.store, &self.stream, &self.default_state, &self.policy).await
    }
}

impl<P, S> std::fmt::Debug for GlobalProjection<P, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalProjection")
            .field("stream", &self.stream)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
