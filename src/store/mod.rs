use async_trait::async_trait;
use uuid::Uuid;

use crate::aggregate::Aggregate;
use crate::error::StoreError;
use crate::event::StoreEvent;
use crate::types::Version;

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use in_memory::InMemoryEventStore;
#[cfg(feature = "postgres")]
pub use postgres::PgEventStore;

/// Persists and replays one aggregate type's event stream, and records each appended event
/// into that same aggregate type's outbox row as part of the same atomic operation, so the
/// event and the fact that it needs relaying are always written together.
#[async_trait]
pub trait EventStore<A>: Send + Sync
where
    A: Aggregate,
{
    /// Loads every event ever emitted by `aggregate_id`, in version order.
    async fn by_aggregate_id(&self, aggregate_id: Uuid) -> Result<Vec<StoreEvent<A::Event>>, StoreError>;

    /// Appends `event` as the event immediately following `expected_version` in
    /// `aggregate_id`'s stream. Returns [`StoreError::VersionConflict`] if another writer
    /// already appended an event at that position.
    async fn append(
        &self,
        aggregate_id: Uuid,
        expected_version: Version,
        event: A::Event,
    ) -> Result<StoreEvent<A::Event>, StoreError>;
}
