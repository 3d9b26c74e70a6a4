//! Operational error taxonomy shared by every [`crate::store::EventStore`] implementation.
//!
//! Domain rejections (an account already closed, an amount that isn't positive, ...) are
//! *not* `StoreError`s: they live in `AccountError`/`TransactionError` and are returned as
//! the `Ok(Err(_))` arm of [`crate::manager::CommandDispatcher::handle_command`]'s nested
//! `Result`.

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// Someone else appended an event to this aggregate instance between our read and our
    /// write. The caller's `CommandDispatcher` retries on this variant.
    #[error("version conflict: expected version {expected}, found {actual}")]
    VersionConflict { expected: i64, actual: i64 },

    /// The connection pool, transaction, or underlying query failed.
    #[error("sql error: {0}")]
    Sql(#[from] sqlx::Error),

    /// An event payload failed to serialize or deserialize.
    #[error("(de)serialization error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A row read back from storage violates an invariant the writer should have upheld
    /// (e.g. a sequence number gap). This should never happen outside of manual DB surgery.
    #[error("data corruption: {0}")]
    Corruption(String),

    /// The operation was cancelled (e.g. shutdown signalled mid-poll).
    #[error("operation cancelled")]
    Cancelled,
}

/// Marker trait implemented by every per-aggregate domain error enum.
///
/// Kept separate from `std::error::Error` plus `thiserror::Error` only to give call sites a
/// single bound to reach for; every real implementor derives both via `#[derive(thiserror::Error)]`.
pub trait DomainError: std::error::Error + Send + Sync + 'static {}
