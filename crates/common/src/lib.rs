//! Shared types for the event-sourcing core.
//!
//! - [`SubjectId`] and [`SequenceNumber`] identify and order events
//! - [`WorkflowError`] and [`Stage`] form the result envelope every workflow returns
//! - [`EngineConfig`] and [`SnapshotConfig`] carry construction-time configuration
//! - [`Clock`] abstracts time so event stamping is deterministic under test

pub mod clock;
pub mod config;
pub mod error;
pub mod telemetry;
pub mod types;

pub use clock::{Clock, SystemClock};
pub use config::{ConfigError, EngineConfig, SnapshotConfig};
pub use error::{Stage, WorkflowError, WorkflowResult};
pub use types::{SequenceNumber, SubjectId, SubjectIdError};
