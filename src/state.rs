use uuid::Uuid;

use crate::event::StoreEvent;
use crate::types::Version;

/// Wraps an aggregate's folded state together with its identity and the version of the
/// last event folded into it. The version is what `CommandDispatcher` sends back as
/// `expected` when appending the next event, giving optimistic concurrency for free.
#[derive(Clone)]
pub struct AggregateState<S> {
    id: Uuid,
    version: Version,
    inner: S,
}

impl<S: Default> AggregateState<S> {
    /// A state for an aggregate instance that has not yet emitted any events.
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            version: 0,
            inner: S::default(),
        }
    }
}

impl<S> AggregateState<S> {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    /// Folds a batch of freshly-persisted events onto this state, advancing the version
    /// to match. `apply` is `Aggregate::apply_event`.
    pub fn apply_store_events<E>(
        mut self,
        events: impl IntoIterator<Item = StoreEvent<E>>,
        apply: impl Fn(S, &StoreEvent<E>) -> S,
    ) -> Self {
        for event in events {
            self.version = event.version;
            self.inner = apply(self.inner, &event);
        }
        self
    }
}
