use rust_decimal::Decimal;

use crate::aggregate::Aggregate;
use crate::domain::account::command::AccountCommand;
use crate::domain::account::error::AccountError;
use crate::domain::account::event::AccountEvent;
use crate::domain::account::state::{AccountState, Lifecycle};
use crate::event::StoreEvent;

/// Zero-sized marker: the account aggregate's identity is its type, not a value, since the
/// event store instance — not the aggregate — owns persistence. See `CommandDispatcher`.
pub struct AccountAggregate;

impl Aggregate for AccountAggregate {
    const NAME: &'static str = "account";

    type State = AccountState;
    type Command = AccountCommand;
    type Event = AccountEvent;
    type Error = AccountError;

    fn handle_command(state: &AccountState, command: AccountCommand) -> Result<Option<AccountEvent>, AccountError> {
        match command {
            AccountCommand::Open { name, currency } => match state.lifecycle {
                Lifecycle::Unopened => Ok(Some(AccountEvent::Opened { name, currency })),
                Lifecycle::Opened | Lifecycle::Closed => Err(AccountError::AccountAlreadyOpened),
            },
            AccountCommand::Deposit { currency, amount, user } => {
                require_opened(state)?;
                require_positive(amount)?;
                Ok(Some(AccountEvent::MoneyDeposited { currency, amount, user }))
            }
            AccountCommand::Withdraw { currency, amount, user } => {
                require_opened(state)?;
                require_positive(amount)?;
                Ok(Some(AccountEvent::MoneyWithdrawn { currency, amount, user }))
            }
            AccountCommand::Close => match state.lifecycle {
                Lifecycle::Unopened => Err(AccountError::AccountNotOpened),
                Lifecycle::Opened => Ok(Some(AccountEvent::Closed)),
                Lifecycle::Closed => Ok(None),
            },
            AccountCommand::UpdateName { name } => {
                require_opened(state)?;
                Ok(Some(AccountEvent::NameUpdated { name }))
            }
        }
    }

    fn apply_event(mut state: AccountState, event: &StoreEvent<AccountEvent>) -> AccountState {
        match event.payload() {
            AccountEvent::Opened { name, currency } => {
                state.lifecycle = Lifecycle::Opened;
                state.name = name.clone();
                state.balances.entry(currency.clone()).or_default();
                state.opened_at = Some(event.occurred_on);
            }
            AccountEvent::MoneyDeposited { currency, amount, .. } => {
                *state.balances.entry(currency.clone()).or_default() += *amount;
            }
            AccountEvent::MoneyWithdrawn { currency, amount, .. } => {
                *state.balances.entry(currency.clone()).or_default() -= *amount;
            }
            AccountEvent::Closed => {
                state.lifecycle = Lifecycle::Closed;
                state.closed_at = Some(event.occurred_on);
            }
            AccountEvent::NameUpdated { name } => {
                state.name = name.clone();
            }
        }
        state
    }
}

fn require_opened(state: &AccountState) -> Result<(), AccountError> {
    match state.lifecycle {
        Lifecycle::Opened => Ok(()),
        Lifecycle::Unopened | Lifecycle::Closed => Err(AccountError::AccountNotOpened),
    }
}

fn require_positive(amount: Decimal) -> Result<(), AccountError> {
    if amount > Decimal::ZERO {
        Ok(())
    } else {
        Err(AccountError::AmountNotPositive)
    }
}
