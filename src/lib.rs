//! Event-sourced personal finance core: a generic event store with per-aggregate optimistic
//! concurrency and a transactional outbox, the `Account`/`Transaction` aggregate contract,
//! a command dispatcher, an outbox relay, the accounts balance projection, and the
//! transfer-to-account policy.

pub mod aggregate;
pub mod cancel;
pub mod config;
pub mod domain;
pub mod error;
pub mod event;
pub mod handler;
pub mod manager;
pub mod outbox;
pub mod policy;
pub mod projection;
pub mod sql;
pub mod state;
pub mod store;
pub mod telemetry;
pub mod types;

pub use aggregate::Aggregate;
pub use cancel::CancellationToken;
pub use error::StoreError;
pub use event::{Event, StoreEvent};
pub use handler::EventHandler;
pub use manager::CommandDispatcher;
pub use state::AggregateState;
