pub mod accounts;

pub use accounts::{AccountSnapshot, AccountsProjection};
