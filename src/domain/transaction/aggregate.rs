use rust_decimal::Decimal;

use crate::aggregate::Aggregate;
use crate::domain::transaction::command::TransactionCommand;
use crate::domain::transaction::error::TransactionError;
use crate::domain::transaction::event::TransactionEvent;
use crate::domain::transaction::state::{Kind, Lifecycle, TransactionState};
use crate::domain::values::{Entry, Side};
use crate::event::StoreEvent;

pub struct TransactionAggregate;

impl Aggregate for TransactionAggregate {
    const NAME: &'static str = "transaction";

    type State = TransactionState;
    type Command = TransactionCommand;
    type Event = TransactionEvent;
    type Error = TransactionError;

    fn handle_command(
        _state: &TransactionState,
        command: TransactionCommand,
    ) -> Result<Option<TransactionEvent>, TransactionError> {
        match command {
            TransactionCommand::RegisterExpense { account_id, currency, amount, category, description } => {
                require_positive(amount)?;
                Ok(Some(TransactionEvent::MoneySpent { account_id, currency, amount, category, description }))
            }
            TransactionCommand::RegisterIncome { account_id, currency, amount, category, description } => {
                require_positive(amount)?;
                Ok(Some(TransactionEvent::MoneyReceived { account_id, currency, amount, category, description }))
            }
            TransactionCommand::RegisterTransfer {
                from_account_id,
                from_currency,
                from_amount,
                to_account_id,
                to_currency,
                to_amount,
                category,
                description,
            } => {
                if from_account_id == to_account_id && from_currency == to_currency {
                    return Err(TransactionError::InvalidAccountPair);
                }
                if from_currency == to_currency {
                    if from_amount != to_amount {
                        return Err(TransactionError::CurrencyMismatch);
                    }
                    require_positive(from_amount)?;
                } else {
                    require_positive(from_amount)?;
                    require_positive(to_amount)?;
                }
                Ok(Some(TransactionEvent::MoneyTransfered {
                    from_account_id,
                    from_currency,
                    from_amount,
                    to_account_id,
                    to_currency,
                    to_amount,
                    category,
                    description,
                }))
            }
            TransactionCommand::RegisterReimbursement { account_id, from, currency, amount } => {
                require_positive(amount)?;
                Ok(Some(TransactionEvent::ReimbursementReceived { account_id, from, currency, amount }))
            }
            TransactionCommand::RegisterDeposit { account_id, currency, amount, category, description } => {
                require_positive(amount)?;
                Ok(Some(TransactionEvent::MoneyDeposited { account_id, currency, amount, category, description }))
            }
            TransactionCommand::RegisterWithdrawal { account_id, currency, amount, category, description } => {
                require_positive(amount)?;
                Ok(Some(TransactionEvent::MoneyWithdrawn { account_id, currency, amount, category, description }))
            }
            TransactionCommand::SetExpectedReimbursement { account_id, currency, amount } => {
                require_positive(amount)?;
                Ok(Some(TransactionEvent::ExpectedReimbursementSet { account_id, currency, amount }))
            }
            TransactionCommand::Delete => match _state.lifecycle {
                Lifecycle::Created => Ok(Some(TransactionEvent::Deleted)),
                Lifecycle::Pending | Lifecycle::Deleted => Ok(None),
            },
        }
    }

    fn apply_event(mut state: TransactionState, event: &StoreEvent<TransactionEvent>) -> TransactionState {
        match event.payload() {
            TransactionEvent::MoneySpent { account_id, currency, amount, category, description } => {
                state.lifecycle = Lifecycle::Created;
                state.kind = Some(Kind::Expense);
                state.category = category.clone();
                state.description = description.clone();
                state.entries.push(Entry {
                    account_id: *account_id,
                    currency: currency.clone(),
                    amount: *amount,
                    side: Side::Debit,
                });
            }
            TransactionEvent::MoneyReceived { account_id, currency, amount, category, description } => {
                state.lifecycle = Lifecycle::Created;
                state.kind = Some(Kind::Income);
                state.category = category.clone();
                state.description = description.clone();
                state.entries.push(Entry {
                    account_id: *account_id,
                    currency: currency.clone(),
                    amount: *amount,
                    side: Side::Credit,
                });
            }
            TransactionEvent::MoneyTransfered {
                from_account_id,
                from_currency,
                from_amount,
                to_account_id,
                to_currency,
                to_amount,
                category,
                description,
            } => {
                state.lifecycle = Lifecycle::Created;
                state.kind = Some(Kind::Transfer);
                state.category = category.clone();
                state.description = description.clone();
                state.entries.push(Entry {
                    account_id: *from_account_id,
                    currency: from_currency.clone(),
                    amount: *from_amount,
                    side: Side::Debit,
                });
                state.entries.push(Entry {
                    account_id: *to_account_id,
                    currency: to_currency.clone(),
                    amount: *to_amount,
                    side: Side::Credit,
                });
            }
            TransactionEvent::ReimbursementReceived { account_id, currency, amount, .. } => {
                state.lifecycle = Lifecycle::Created;
                state.kind = Some(Kind::Reimbursement);
                state.entries.push(Entry {
                    account_id: *account_id,
                    currency: currency.clone(),
                    amount: *amount,
                    side: Side::Credit,
                });
            }
            TransactionEvent::MoneyDeposited { account_id, currency, amount, category, description } => {
                state.lifecycle = Lifecycle::Created;
                state.kind = Some(Kind::Deposit);
                state.category = category.clone();
                state.description = description.clone();
                state.entries.push(Entry {
                    account_id: *account_id,
                    currency: currency.clone(),
                    amount: *amount,
                    side: Side::Credit,
                });
            }
            TransactionEvent::MoneyWithdrawn { account_id, currency, amount, category, description } => {
                state.lifecycle = Lifecycle::Created;
                state.kind = Some(Kind::Withdrawal);
                state.category = category.clone();
                state.description = description.clone();
                state.entries.push(Entry {
                    account_id: *account_id,
                    currency: currency.clone(),
                    amount: *amount,
                    side: Side::Debit,
                });
            }
            TransactionEvent::ExpectedReimbursementSet { currency, amount, .. } => {
                state.lifecycle = Lifecycle::Created;
                state.kind = Some(Kind::ExpectedReimbursement);
                state.expected_reimbursement = Some((currency.clone(), *amount));
            }
            TransactionEvent::Deleted => {
                state.lifecycle = Lifecycle::Deleted;
            }
        }
        state
    }
}

fn require_positive(amount: Decimal) -> Result<(), TransactionError> {
    if amount > Decimal::ZERO {
        Ok(())
    } else {
        Err(TransactionError::AmountNotPositive)
    }
}
