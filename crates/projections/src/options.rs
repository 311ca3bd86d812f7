use common::{EngineConfig, SnapshotConfig};

/// Construction-time configuration of a projection.
#[derive(Debug, Clone)]
pub struct ProjectionOptions<P> {
    /// Key snapshots are stored under; for global projections also the
    /// name of the stream.
    pub projection_name: String,
    /// The state before any event is applied.
    pub default_state: P,
    /// Snapshotting is disabled when `None`.
    pub snapshot: Option<SnapshotConfig>,
}

impl<P> ProjectionOptions<P> {
    pub fn new(projection_name: impl Into<String>, default_state: P) -> Self {
        Self {
            projection_name: projection_name.into(),
            default_state,
            snapshot: None,
        }
    }

    pub fn with_snapshot(mut self, snapshot: SnapshotConfig) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    /// Takes the snapshot settings from `config`.
    pub fn from_engine_config(
        config: &EngineConfig,
        projection_name: impl Into<String>,
        default_state: P,
    ) -> Self {
        Self {
            projection_name: projection_name.into(),
            default_state,
            snapshot: config.snapshot,
        }
    }
}
