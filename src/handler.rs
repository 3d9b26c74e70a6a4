use async_trait::async_trait;

use crate::aggregate::Aggregate;
use crate::error::StoreError;
use crate::event::StoreEvent;

/// A subscriber reacting to one aggregate type's events, delivered at-least-once by an
/// [`crate::outbox::OutboxRelay`]. Implemented by both read-model projections
/// (`AccountsProjection`) and reactive policies (`TransferToAccountPolicy`) — the same
/// delivery contract serves both, just with different effects.
///
/// `handle` is responsible for its own idempotency: record a `(subscriber name, dedup key)`
/// row in `processed_records` in the same transaction as whatever side effect it performs,
/// so a redelivered event is a no-op rather than double-applied.
#[async_trait]
pub trait EventHandler<A>: Send + Sync
where
    A: Aggregate,
{
    /// Identifies this subscriber in `processed_records`. Must be stable across restarts.
    fn name(&self) -> &'static str;

    async fn handle(&self, event: &StoreEvent<A::Event>) -> Result<(), StoreError>;
}
