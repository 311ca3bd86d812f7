//! Event-sourcing core.
//!
//! This crate turns commands into persisted events and events back into
//! state:
//! - [`EventSequencer`] assigns ordered identifiers to new events
//! - [`hydrate`] folds a snapshot or default state with pending events
//! - [`SnapshotPolicy`] decides when a snapshot is written
//! - [`AggregateService`] runs the command workflow (`push`) and aggregate reads (`get`)
//! - [`read_stream`] is the query workflow shared with projections
//!
//! Storage and publishing are injected through the `event-store` contracts.

pub mod aggregate;
pub mod command;
pub mod hydrator;
pub mod query;
pub mod sequencer;
pub mod service;
pub mod snapshot_policy;

pub use aggregate::{Aggregate, Apply};
pub use command::CommandHandler;
pub use event_store::DomainEvent;
pub use hydrator::{accepts_snapshot, fold, hydrate};
pub use query::read_stream;
pub use sequencer::{
    EventSequencer, last_folded_sequence, last_known_sequence, last_snapshot_sequence,
};
pub use service::{AggregateOptions, AggregateService};
pub use snapshot_policy::SnapshotPolicy;
