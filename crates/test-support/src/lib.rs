//! Shared fixtures for the workspace's integration tests and benches.

mod clock;
mod failing;
mod fixtures;
mod product;

pub use clock::FixedClock;
pub use failing::{FailingEventStore, FailingPublisher};
pub use fixtures::{FIXTURE_SOURCE, fixture_start, product_event, projection_test_events};
pub use product::{
    Product, ProductActivity, ProductCommand, ProductCommandHandler, ProductError, ProductEvent,
    ProductHistory,
};
