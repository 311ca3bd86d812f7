//! Command handling contract.

use async_trait::async_trait;

use crate::aggregate::Aggregate;

/// Decides which events a command produces against the current state.
///
/// Handlers validate the command and either return the resulting events in
/// order (possibly none) or reject it with the aggregate's error type. A
/// rejection becomes a `Command` stage failure. Transports may deliver a
/// command more than once and nothing here deduplicates, so handlers must
/// tolerate redelivery.
#[async_trait]
pub trait CommandHandler<A: Aggregate>: Send + Sync {
    async fn handle(&self, state: &A, command: A::Command) -> Result<Vec<A::Event>, A::Error>;
}

#[async_trait]
impl<A, H> CommandHandler<A> for std::sync::Arc<H>
where
    A: Aggregate,
    H: CommandHandler<A> + ?Sized,
{
    async fn handle(&self, state: &A, command: A::Command) -> Result<Vec<A::Event>, A::Error> {
        (**self).handle(state, command).await
    }
}
