use crate::domain::values::Entry;
use crate::types::{Currency, Money};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Lifecycle {
    /// No `RegisterX` command has been applied yet. Not one of spec's named post-event
    /// states ({Created, Deleted}) — only `Default::default()`'s zero value.
    #[default]
    Pending,
    Created,
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Expense,
    Income,
    Transfer,
    Reimbursement,
    Deposit,
    Withdrawal,
    ExpectedReimbursement,
}

#[derive(Debug, Clone, Default)]
pub struct TransactionState {
    pub lifecycle: Lifecycle,
    pub kind: Option<Kind>,
    pub entries: Vec<Entry>,
    pub category: String,
    pub description: String,
    pub expected_reimbursement: Option<(Currency, Money)>,
}
