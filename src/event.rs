use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::types::{GlobalSequence, Version};

/// Marker trait for the event payloads a concrete [`crate::aggregate::Aggregate`] emits.
///
/// Implementors only need to be `(De)Serialize` — the event's identity (which aggregate
/// type, which version) is carried by the [`StoreEvent`] envelope, not the payload itself.
pub trait Event: serde::Serialize + serde::de::DeserializeOwned + Send + Sync + Clone + 'static {}

/// A persisted event record, wrapping the domain payload with the stream it belongs to, its
/// position within that stream, and its position within the global, per-aggregate-type
/// sequence the outbox relay and projections replay.
#[derive(Debug, Clone)]
pub struct StoreEvent<E> {
    /// Uniquely identifies this event among all events ever emitted, of any aggregate type.
    pub id: Uuid,
    /// The aggregate instance that emitted this event.
    pub aggregate_id: Uuid,
    /// The event payload.
    pub payload: E,
    /// Position within `aggregate_id`'s own stream. Starts at 1.
    pub version: Version,
    /// Position within this event's aggregate *type*'s global ordering. Backs outbox/
    /// projection cursors, never reset per-instance.
    pub global_sequence: GlobalSequence,
    /// Wall-clock time the store committed this event.
    pub occurred_on: DateTime<Utc>,
}

impl<E> StoreEvent<E> {
    pub fn payload(&self) -> &E {
        &self.payload
    }
}
