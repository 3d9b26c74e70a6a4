use uuid::Uuid;

use crate::aggregate::Aggregate;
use crate::cancel::CancellationToken;
use crate::error::StoreError;
use crate::event::StoreEvent;
use crate::state::AggregateState;
use crate::store::EventStore;

const DEFAULT_MAX_RETRIES: u32 = 3;

/// Checks that a freshly-loaded history forms the dense sequence `1, 2, ..., N`, surfacing
/// a gap or duplicate as [`StoreError::Corruption`] rather than silently folding a history
/// the store should never have produced.
fn verify_dense_versions<E>(aggregate_id: Uuid, events: &[StoreEvent<E>]) -> Result<(), StoreError> {
    for (index, event) in events.iter().enumerate() {
        let expected = (index + 1) as i64;
        if event.version != expected {
            return Err(StoreError::Corruption(format!(
                "aggregate {aggregate_id}: expected version {expected} at position {index}, found {}",
                event.version
            )));
        }
    }
    Ok(())
}

/// Couples an [`Aggregate`] with a [`EventStore`], handling the full load-validate-append
/// cycle a command goes through: load current state, ask the aggregate to validate the
/// command against it, append the resulting event at the expected version, and retry from
/// the top (bounded) if another writer raced us to that version.
///
/// Returns a *nested* `Result`: the outer `Err` is an operational failure (the store is
/// unreachable, retries exhausted), the inner `Err` is the aggregate rejecting the command —
/// a value, not a fault.
pub struct CommandDispatcher<A, Store> {
    store: Store,
    max_retries: u32,
    _aggregate: std::marker::PhantomData<A>,
}

impl<A, Store> CommandDispatcher<A, Store>
where
    A: Aggregate,
    Store: EventStore<A>,
{
    pub fn new(store: Store) -> Self {
        Self {
            store,
            max_retries: DEFAULT_MAX_RETRIES,
            _aggregate: std::marker::PhantomData,
        }
    }

    pub fn with_max_retries(store: Store, max_retries: u32) -> Self {
        Self {
            store,
            max_retries,
            _aggregate: std::marker::PhantomData,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Loads `aggregate_id`'s state by replaying its full history.
    #[tracing::instrument(skip(self), fields(aggregate = A::NAME, %aggregate_id))]
    pub async fn load(&self, aggregate_id: Uuid) -> Result<AggregateState<A::State>, StoreError> {
        self.load_cancellable(aggregate_id, &mut CancellationToken::never()).await
    }

    /// As [`Self::load`], but abandons the read and returns [`StoreError::Cancelled`] if
    /// `cancel` fires first, discarding any partial read.
    pub async fn load_cancellable(
        &self,
        aggregate_id: Uuid,
        cancel: &mut CancellationToken,
    ) -> Result<AggregateState<A::State>, StoreError> {
        let events = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(StoreError::Cancelled),
            result = self.store.by_aggregate_id(aggregate_id) => result?,
        };
        verify_dense_versions(aggregate_id, &events)?;
        let mut state = AggregateState::new(aggregate_id);
        state = state.apply_store_events(events, A::apply_event);
        Ok(state)
    }

    /// Validates and handles `command` against `aggregate_id`'s current state, retrying on
    /// [`StoreError::VersionConflict`] up to `max_retries` times before giving up.
    #[tracing::instrument(skip(self, command), fields(aggregate = A::NAME, %aggregate_id))]
    pub async fn handle_command(
        &self,
        aggregate_id: Uuid,
        command: A::Command,
    ) -> Result<Result<A::State, A::Error>, StoreError> {
        self.handle_command_cancellable(aggregate_id, command, &mut CancellationToken::never())
            .await
    }

    /// As [`Self::handle_command`], but abandons the operation and returns
    /// [`StoreError::Cancelled`] if `cancel` fires first. Cancellation is checked before
    /// each load and before the eventual append; once an append's future has been polled to
    /// completion its transaction has already committed and the event is persisted —
    /// cancellation only prevents a *new* event from being written, it never undoes one
    /// already committed.
    pub async fn handle_command_cancellable(
        &self,
        aggregate_id: Uuid,
        command: A::Command,
        cancel: &mut CancellationToken,
    ) -> Result<Result<A::State, A::Error>, StoreError> {
        let mut attempt = 0;
        loop {
            if cancel.is_cancelled() {
                return Err(StoreError::Cancelled);
            }
            let state = self.load_cancellable(aggregate_id, cancel).await?;

            let event = match A::handle_command(state.inner(), command.clone()) {
                Err(domain_error) => return Ok(Err(domain_error)),
                Ok(None) => return Ok(Ok(state.into_inner())),
                Ok(Some(event)) => event,
            };

            let appended = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(StoreError::Cancelled),
                result = self.store.append(aggregate_id, state.version(), event) => result,
            };

            match appended {
                Ok(stored) => {
                    let next_state = state.apply_store_events(std::iter::once(stored), A::apply_event);
                    return Ok(Ok(next_state.into_inner()));
                }
                Err(StoreError::VersionConflict { .. }) if attempt < self.max_retries => {
                    attempt += 1;
                    tracing::debug!(attempt, "version conflict, retrying command");
                    continue;
                }
                Err(other) => return Err(other),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn event_at(version: i64) -> StoreEvent<()> {
        StoreEvent {
            id: Uuid::new_v4(),
            aggregate_id: Uuid::new_v4(),
            payload: (),
            version,
            global_sequence: version,
            occurred_on: Utc::now(),
        }
    }

    #[test]
    fn dense_sequence_is_accepted() {
        let events = vec![event_at(1), event_at(2), event_at(3)];
        assert!(verify_dense_versions(Uuid::new_v4(), &events).is_ok());
    }

    #[test]
    fn gap_is_corruption() {
        let events = vec![event_at(1), event_at(3)];
        assert!(matches!(
            verify_dense_versions(Uuid::new_v4(), &events),
            Err(StoreError::Corruption(_))
        ));
    }

    #[test]
    fn duplicate_is_corruption() {
        let events = vec![event_at(1), event_at(1)];
        assert!(matches!(
            verify_dense_versions(Uuid::new_v4(), &events),
            Err(StoreError::Corruption(_))
        ));
    }
}
