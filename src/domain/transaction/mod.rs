pub mod aggregate;
pub mod command;
pub mod error;
pub mod event;
pub mod state;

pub use aggregate::TransactionAggregate;
pub use command::TransactionCommand;
pub use error::TransactionError;
pub use event::TransactionEvent;
pub use state::{Kind, Lifecycle, TransactionState};

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use super::*;
    use crate::aggregate::Aggregate;
    use crate::types::Currency;

    fn eur() -> Currency {
        Currency::new("EUR")
    }

    fn usd() -> Currency {
        Currency::new("USD")
    }

    #[test]
    fn same_account_same_currency_transfer_is_rejected() {
        let account = Uuid::new_v4();
        let result = TransactionAggregate::handle_command(
            &TransactionState::default(),
            TransactionCommand::RegisterTransfer {
                from_account_id: account,
                from_currency: eur(),
                from_amount: Decimal::from(10),
                to_account_id: account,
                to_currency: eur(),
                to_amount: Decimal::from(10),
                category: "".into(),
                description: "".into(),
            },
        );
        assert_eq!(result, Err(TransactionError::InvalidAccountPair));
    }

    #[test]
    fn same_account_different_currency_transfer_is_allowed() {
        let account = Uuid::new_v4();
        let result = TransactionAggregate::handle_command(
            &TransactionState::default(),
            TransactionCommand::RegisterTransfer {
                from_account_id: account,
                from_currency: usd(),
                from_amount: Decimal::from(100),
                to_account_id: account,
                to_currency: eur(),
                to_amount: Decimal::from(92),
                category: "".into(),
                description: "".into(),
            },
        );
        assert!(matches!(result, Ok(Some(TransactionEvent::MoneyTransfered { .. }))));
    }

    #[test]
    fn same_currency_transfer_requires_equal_amounts() {
        let result = TransactionAggregate::handle_command(
            &TransactionState::default(),
            TransactionCommand::RegisterTransfer {
                from_account_id: Uuid::new_v4(),
                from_currency: eur(),
                from_amount: Decimal::from(50),
                to_account_id: Uuid::new_v4(),
                to_currency: eur(),
                to_amount: Decimal::from(40),
                category: "".into(),
                description: "".into(),
            },
        );
        assert_eq!(result, Err(TransactionError::CurrencyMismatch));
    }

    #[test]
    fn expected_reimbursement_does_not_append_an_entry() {
        let mut state = TransactionState::default();
        let event = TransactionEvent::ExpectedReimbursementSet {
            account_id: Uuid::new_v4(),
            currency: eur(),
            amount: Decimal::from(20),
        };
        state = apply(state, event);
        assert!(state.entries.is_empty());
        assert!(state.expected_reimbursement.is_some());
    }

    #[test]
    fn delete_is_idempotent() {
        let mut state = TransactionState::default();
        state.lifecycle = Lifecycle::Deleted;
        let result = TransactionAggregate::handle_command(&state, TransactionCommand::Delete);
        assert_eq!(result, Ok(None));
    }

    fn apply(state: TransactionState, event: TransactionEvent) -> TransactionState {
        use chrono::Utc;
        use uuid::Uuid;

        use crate::event::StoreEvent;

        TransactionAggregate::apply_event(
            state,
            &StoreEvent {
                id: Uuid::new_v4(),
                aggregate_id: Uuid::new_v4(),
                payload: event,
                version: 1,
                global_sequence: 1,
                occurred_on: Utc::now(),
            },
        )
    }
}
