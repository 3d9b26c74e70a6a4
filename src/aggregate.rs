use crate::error::DomainError;
use crate::event::{Event, StoreEvent};

/// The contract every aggregate type (`AccountAggregate`, `TransactionAggregate`, ...)
/// implements: fold its own events into a state, and validate commands against that state.
///
/// `handle_command` returns at most one event per command (`Option`, not `Vec`) — every
/// command in this domain records a single fact, and a narrower return type keeps that true
/// at the signature level instead of only by convention.
pub trait Aggregate {
    /// Table/stream name prefix, e.g. `"account"` becomes `account_events`/`account_outbox`.
    const NAME: &'static str;

    type State: Default + Send + Sync;
    type Command: Clone + Send + Sync;
    type Event: Event;
    type Error: DomainError;

    /// Validates `command` against the current `state` and, if accepted, returns the one
    /// event that records the outcome. Returns `Ok(None)` for accepted no-ops (e.g. closing
    /// an already-closed account) and `Err(_)` for rejected commands.
    fn handle_command(state: &Self::State, command: Self::Command) -> Result<Option<Self::Event>, Self::Error>;

    /// Folds a single persisted event onto `state`, producing the next state. Must be a
    /// pure, infallible function of its inputs — it runs both when appending a new event
    /// and when replaying history to rebuild state. Takes the full [`StoreEvent`] envelope
    /// (not just the payload) so folds that need the commit timestamp — an account's
    /// `opened_at`/`closed_at` — don't have to duplicate it inside the event payload.
    fn apply_event(state: Self::State, event: &StoreEvent<Self::Event>) -> Self::State;
}
