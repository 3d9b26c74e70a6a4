use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::account::command::AccountCommand;
use crate::domain::account::AccountAggregate;
use crate::domain::transaction::event::TransactionEvent;
use crate::domain::transaction::TransactionAggregate;
use crate::error::StoreError;
use crate::event::StoreEvent;
use crate::handler::EventHandler;
use crate::manager::CommandDispatcher;
use crate::store::EventStore;

const SUBSCRIBER_NAME: &str = "transfer_to_account_policy";

/// Reacts to `MoneyTransfered` by issuing `Withdraw`/`Deposit` on the two accounts involved.
/// Dedup keys are `"withdraw:{global_sequence}"`/`"deposit:{global_sequence}"` rather than
/// one key per transfer, so a redelivered transfer whose withdraw already landed only
/// retries the deposit leg.
pub struct TransferToAccountPolicy<Store> {
    pool: PgPool,
    accounts: CommandDispatcher<AccountAggregate, Store>,
}

impl<Store> TransferToAccountPolicy<Store>
where
    Store: EventStore<AccountAggregate>,
{
    pub fn new(pool: PgPool, accounts: CommandDispatcher<AccountAggregate, Store>) -> Self {
        Self { pool, accounts }
    }

    async fn already_processed(&self, dedup_key: &str) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT 1 FROM processed_records WHERE subscriber_name = $1 AND dedup_key = $2")
            .bind(SUBSCRIBER_NAME)
            .bind(dedup_key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn mark_processed(&self, dedup_key: &str) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO processed_records (subscriber_name, dedup_key) VALUES ($1, $2) ON CONFLICT DO NOTHING")
            .bind(SUBSCRIBER_NAME)
            .bind(dedup_key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl<Store> EventHandler<TransactionAggregate> for TransferToAccountPolicy<Store>
where
    Store: EventStore<AccountAggregate>,
{
    fn name(&self) -> &'static str {
        SUBSCRIBER_NAME
    }

    async fn handle(&self, event: &StoreEvent<TransactionEvent>) -> Result<(), StoreError> {
        let TransactionEvent::MoneyTransfered {
            from_account_id,
            from_currency,
            from_amount,
            to_account_id,
            to_currency,
            to_amount,
            ..
        } = event.payload()
        else {
            return Ok(());
        };

        let withdraw_key = format!("withdraw:{}", event.global_sequence);
        if !self.already_processed(&withdraw_key).await? {
            let outcome = self
                .accounts
                .handle_command(
                    *from_account_id,
                    AccountCommand::Withdraw {
                        currency: from_currency.clone(),
                        amount: *from_amount,
                        user: "system".to_string(),
                    },
                )
                .await?;
            if let Err(domain_error) = outcome {
                tracing::error!(%domain_error, "transfer withdraw leg rejected");
            }
            self.mark_processed(&withdraw_key).await?;
        }

        let deposit_key = format!("deposit:{}", event.global_sequence);
        if !self.already_processed(&deposit_key).await? {
            let outcome = self
                .accounts
                .handle_command(
                    *to_account_id,
                    AccountCommand::Deposit {
                        currency: to_currency.clone(),
                        amount: *to_amount,
                        user: "system".to_string(),
                    },
                )
                .await?;
            if let Err(domain_error) = outcome {
                tracing::error!(%domain_error, "transfer deposit leg rejected");
            }
            self.mark_processed(&deposit_key).await?;
        }

        Ok(())
    }
}
