use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::aggregate::Aggregate;
use crate::error::StoreError;
use crate::event::StoreEvent;
use crate::store::EventStore;
use crate::types::Version;

/// Test double only: keeps events in a process-local `DashMap`, never touches a database,
/// and has no outbox relay to poll since there is no concurrent process to deliver to.
/// Event storage here does not survive a process restart and must never be used outside
/// of tests.
pub struct InMemoryEventStore<A: Aggregate> {
    streams: Arc<DashMap<Uuid, Vec<StoreEvent<A::Event>>>>,
    global_sequence: Arc<AtomicI64>,
}

impl<A: Aggregate> Default for InMemoryEventStore<A> {
    fn default() -> Self {
        Self {
            streams: Arc::new(DashMap::new()),
            global_sequence: Arc::new(AtomicI64::new(0)),
        }
    }
}

impl<A: Aggregate> Clone for InMemoryEventStore<A> {
    fn clone(&self) -> Self {
        Self {
            streams: Arc::clone(&self.streams),
            global_sequence: Arc::clone(&self.global_sequence),
        }
    }
}

#[async_trait]
impl<A> EventStore<A> for InMemoryEventStore<A>
where
    A: Aggregate,
    A::Event: Clone,
{
    async fn by_aggregate_id(&self, aggregate_id: Uuid) -> Result<Vec<StoreEvent<A::Event>>, StoreError> {
        Ok(self
            .streams
            .get(&aggregate_id)
            .map(|stream| stream.clone())
            .unwrap_or_default())
    }

    async fn append(
        &self,
        aggregate_id: Uuid,
        expected_version: Version,
        event: A::Event,
    ) -> Result<StoreEvent<A::Event>, StoreError> {
        let mut stream = self.streams.entry(aggregate_id).or_default();

        let current_version = stream.last().map(|e| e.version).unwrap_or(0);
        if current_version != expected_version {
            return Err(StoreError::VersionConflict {
                expected: expected_version,
                actual: current_version,
            });
        }

        let stored = StoreEvent {
            id: Uuid::new_v4(),
            aggregate_id,
            payload: event,
            version: current_version + 1,
            global_sequence: self.global_sequence.fetch_add(1, Ordering::SeqCst) + 1,
            occurred_on: Utc::now(),
        };
        stream.push(stored.clone());
        Ok(stored)
    }
}
