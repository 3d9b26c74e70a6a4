use std::sync::Arc;

use tokio::sync::watch;

/// A cooperative cancellation signal threaded from the transport into dispatcher operations.
/// Backed by `tokio::sync::watch`, the same primitive [`crate::outbox::OutboxRelay`] uses
/// for its own shutdown signal.
///
/// Holds the sender alongside the receiver (when it owns one, see [`Self::never`]) so the
/// channel stays open for the token's whole lifetime — a dropped sender makes `changed()`
/// resolve immediately with an error on first poll, which would make `cancelled()` look
/// like it fired instantly instead of never.
#[derive(Clone)]
pub struct CancellationToken {
    receiver: watch::Receiver<bool>,
    _sender: Option<Arc<watch::Sender<bool>>>,
}

impl CancellationToken {
    /// Wraps a receiver whose sender is kept alive by the caller for at least as long as
    /// this token is in use.
    pub fn new(receiver: watch::Receiver<bool>) -> Self {
        Self { receiver, _sender: None }
    }

    /// A token that never fires — for call sites that don't have a transport-supplied deadline.
    pub fn never() -> Self {
        let (tx, rx) = watch::channel(false);
        Self { receiver: rx, _sender: Some(Arc::new(tx)) }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolves once the signal is set to `true`. Awaiting this alongside a store operation
    /// (via `tokio::select!`) is how `CommandDispatcher`'s cancellable entry points ensure a
    /// cancelled append rolls back its transaction instead of persisting the event —
    /// dropping the in-flight query future rolls back its `sqlx::Transaction`.
    pub async fn cancelled(&mut self) {
        if self.is_cancelled() {
            return;
        }
        while self.receiver.changed().await.is_ok() {
            if *self.receiver.borrow() {
                return;
            }
        }
        // The sender was dropped without ever signalling cancellation: there is nothing
        // left to wait for, so behave as a token that never fires rather than resolving.
        std::future::pending::<()>().await;
    }
}
