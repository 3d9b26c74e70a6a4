use crate::types::{Currency, Money};

#[derive(Debug, Clone)]
pub enum AccountCommand {
    Open { name: String, currency: Currency },
    Deposit { currency: Currency, amount: Money, user: String },
    Withdraw { currency: Currency, amount: Money, user: String },
    Close,
    UpdateName { name: String },
}
