//! Named and global projections for the query side.
//!
//! A projection is a read-oriented state folded from events:
//! - [`NamedProjection`] reads the events of one subject
//! - [`GlobalProjection`] reads every event in the store
//!
//! Both run the shared query workflow from `domain`, so they hydrate from
//! snapshots and may write one on read.

pub mod global;
pub mod named;
pub mod options;

pub use global::GlobalProjection;
pub use named::NamedProjection;
pub use options::ProjectionOptions;
