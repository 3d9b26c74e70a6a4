use uuid::Uuid;

use crate::event::Event;
use crate::types::{Currency, Money};

/// Event names deliberately match `AccountEvent::MoneyDeposited`/`MoneyWithdrawn` for the
/// deposit/withdrawal variants: different Rust enums (different aggregate streams), same
/// `event_type` tag, because the accounts projection's effect table has one row per tag
/// regardless of which aggregate produced it.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum TransactionEvent {
    MoneySpent {
        account_id: Uuid,
        currency: Currency,
        amount: Money,
        category: String,
        description: String,
    },
    MoneyReceived {
        account_id: Uuid,
        currency: Currency,
        amount: Money,
        category: String,
        description: String,
    },
    MoneyTransfered {
        from_account_id: Uuid,
        from_currency: Currency,
        from_amount: Money,
        to_account_id: Uuid,
        to_currency: Currency,
        to_amount: Money,
        category: String,
        description: String,
    },
    ReimbursementReceived {
        account_id: Uuid,
        from: String,
        currency: Currency,
        amount: Money,
    },
    MoneyDeposited {
        account_id: Uuid,
        currency: Currency,
        amount: Money,
        category: String,
        description: String,
    },
    MoneyWithdrawn {
        account_id: Uuid,
        currency: Currency,
        amount: Money,
        category: String,
        description: String,
    },
    ExpectedReimbursementSet {
        account_id: Uuid,
        currency: Currency,
        amount: Money,
    },
    Deleted,
}

impl Event for TransactionEvent {}
