use uuid::Uuid;

use crate::types::{Currency, Money};

#[derive(Debug, Clone)]
pub enum TransactionCommand {
    RegisterExpense {
        account_id: Uuid,
        currency: Currency,
        amount: Money,
        category: String,
        description: String,
    },
    RegisterIncome {
        account_id: Uuid,
        currency: Currency,
        amount: Money,
        category: String,
        description: String,
    },
    RegisterTransfer {
        from_account_id: Uuid,
        from_currency: Currency,
        from_amount: Money,
        to_account_id: Uuid,
        to_currency: Currency,
        to_amount: Money,
        category: String,
        description: String,
    },
    RegisterReimbursement {
        account_id: Uuid,
        from: String,
        currency: Currency,
        amount: Money,
    },
    RegisterDeposit {
        account_id: Uuid,
        currency: Currency,
        amount: Money,
        category: String,
        description: String,
    },
    RegisterWithdrawal {
        account_id: Uuid,
        currency: Currency,
        amount: Money,
        category: String,
        description: String,
    },
    SetExpectedReimbursement {
        account_id: Uuid,
        currency: Currency,
        amount: Money,
    },
    Delete,
}
