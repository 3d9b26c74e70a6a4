use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::types::{Currency, Money};

/// An account's lifecycle. `Opened` is the only state from which money moves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Lifecycle {
    #[default]
    Unopened,
    Opened,
    Closed,
}

/// Derived state of one `Account` aggregate instance: a pure fold of its event history.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountState {
    pub lifecycle: Lifecycle,
    pub name: String,
    pub balances: HashMap<Currency, Money>,
    pub opened_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl AccountState {
    pub fn balance(&self, currency: &Currency) -> Money {
        self.balances.get(currency).copied().unwrap_or_default()
    }
}
