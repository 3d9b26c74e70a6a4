pub mod aggregate;
pub mod command;
pub mod error;
pub mod event;
pub mod state;

pub use aggregate::AccountAggregate;
pub use command::AccountCommand;
pub use error::AccountError;
pub use event::AccountEvent;
pub use state::{AccountState, Lifecycle};
