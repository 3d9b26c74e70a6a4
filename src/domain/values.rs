use uuid::Uuid;

use crate::types::{Currency, Money};

/// Which side of a double-entry a [`Entry`] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Side {
    Debit,
    Credit,
}

/// One leg of a transaction's effect on an account's balance. A `Transfer` produces two —
/// a `Debit` on the source, a `Credit` on the destination — everything else produces one.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Entry {
    pub account_id: Uuid,
    pub currency: Currency,
    pub amount: Money,
    pub side: Side,
}
