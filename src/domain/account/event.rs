use crate::event::Event;
use crate::types::{Currency, Money};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum AccountEvent {
    Opened { name: String, currency: Currency },
    MoneyDeposited { currency: Currency, amount: Money, user: String },
    MoneyWithdrawn { currency: Currency, amount: Money, user: String },
    Closed,
    NameUpdated { name: String },
}

impl Event for AccountEvent {}
