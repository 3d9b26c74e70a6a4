use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use crate::domain::account::event::AccountEvent;
use crate::domain::account::AccountAggregate;
use crate::domain::transaction::event::TransactionEvent;
use crate::domain::transaction::TransactionAggregate;
use crate::error::StoreError;
use crate::event::StoreEvent;
use crate::handler::EventHandler;
use crate::types::{Currency, Money};

const SUBSCRIBER_NAME: &str = "accounts_projection";

/// One row's worth of the accounts balance read model, as read back via [`AccountsProjection::snapshot_all`].
#[derive(Debug, Clone)]
pub struct AccountSnapshot {
    pub id: Uuid,
    pub name: Option<String>,
    pub balance: std::collections::HashMap<Currency, Money>,
    pub created_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
}

/// Folds both `account_events` and `transaction_events` into `accounts_projection`: one row
/// per account, `balance` a JSON object mapping currency to a string-encoded decimal so
/// precision survives the round trip through JSON.
///
/// Implements [`EventHandler`] twice — once per aggregate type — on the same struct, since
/// both streams feed the same read model.
pub struct AccountsProjection {
    pool: PgPool,
}

impl AccountsProjection {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn ensure_row(&self, tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO accounts_projection (id) VALUES ($1) ON CONFLICT (id) DO NOTHING")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// `create(id, created_at)`: inserts the row if absent, preserving an existing
    /// `created_at`.
    async fn create(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        name: &str,
        currency: &Currency,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.ensure_row(tx, id).await?;
        self.touch_currency(tx, id, currency, Decimal::ZERO).await?;
        sqlx::query("UPDATE accounts_projection SET name = $2, created_at = COALESCE(created_at, $3) WHERE id = $1")
            .bind(id)
            .bind(name)
            .bind(at)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// `close(id, closed_at)`: creates the row if absent — an `AccountClosed` event may be
    /// relayed before `AccountOpened` across distinct stores.
    async fn close(&self, tx: &mut Transaction<'_, Postgres>, id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError> {
        self.ensure_row(tx, id).await?;
        sqlx::query("UPDATE accounts_projection SET closed_at = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    async fn rename(&self, tx: &mut Transaction<'_, Postgres>, id: Uuid, name: &str) -> Result<(), StoreError> {
        self.ensure_row(tx, id).await?;
        sqlx::query("UPDATE accounts_projection SET name = $2 WHERE id = $1")
            .bind(id)
            .bind(name)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Ensures `currency` has an entry in the balance map without changing its value if
    /// already present.
    async fn touch_currency(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        currency: &Currency,
        default: Decimal,
    ) -> Result<(), StoreError> {
        let mut balance = self.read_balance(tx, id).await?;
        balance.entry(currency.0.clone()).or_insert_with(|| Value::String(default.to_string()));
        self.write_balance(tx, id, balance).await
    }

    async fn read_balance(&self, tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<Map<String, Value>, StoreError> {
        let row = sqlx::query("SELECT balance FROM accounts_projection WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_one(&mut **tx)
            .await?;
        let value: Value = row.try_get("balance")?;
        Ok(value.as_object().cloned().unwrap_or_default())
    }

    async fn write_balance(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        balance: Map<String, Value>,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE accounts_projection SET balance = $2 WHERE id = $1")
            .bind(id)
            .bind(Value::Object(balance))
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// `apply_delta(id, currency, amount)`: read-modify-write under row lock, initialising a
    /// missing currency entry to zero before adding the signed delta.
    async fn apply_delta(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        currency: &Currency,
        delta: Money,
    ) -> Result<(), StoreError> {
        self.ensure_row(tx, id).await?;
        let mut balance = self.read_balance(tx, id).await?;
        let current: Decimal = balance
            .get(&currency.0)
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();
        balance.insert(currency.0.clone(), Value::String((current + delta).to_string()));
        self.write_balance(tx, id, balance).await
    }

    async fn set_expected_reimbursement(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        currency: &Currency,
        amount: Money,
    ) -> Result<(), StoreError> {
        self.ensure_row(tx, id).await?;
        let row = sqlx::query("SELECT expected_reimbursements FROM accounts_projection WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_one(&mut **tx)
            .await?;
        let value: Value = row.try_get("expected_reimbursements")?;
        let mut expected = value.as_object().cloned().unwrap_or_default();
        expected.insert(currency.0.clone(), Value::String(amount.to_string()));
        sqlx::query("UPDATE accounts_projection SET expected_reimbursements = $2 WHERE id = $1")
            .bind(id)
            .bind(Value::Object(expected))
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Returns every row of the balance read model.
    pub async fn snapshot_all(&self) -> Result<Vec<AccountSnapshot>, StoreError> {
        let rows = sqlx::query("SELECT id, name, balance, created_at, closed_at FROM accounts_projection")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| {
                let balance_json: Value = row.try_get("balance")?;
                let balance = balance_json
                    .as_object()
                    .map(|map| {
                        map.iter()
                            .filter_map(|(k, v)| {
                                let amount: Decimal = v.as_str()?.parse().ok()?;
                                Some((Currency::new(k.clone()), amount))
                            })
                            .collect()
                    })
                    .unwrap_or_default();

                Ok(AccountSnapshot {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                    balance,
                    created_at: row.try_get("created_at")?,
                    closed_at: row.try_get("closed_at")?,
                })
            })
            .collect()
    }

    /// Inserts a dedup row for `dedup_key`. Returns `false` (and performs no other work) if
    /// this record has already been processed by this subscriber.
    async fn mark_processed(&self, tx: &mut Transaction<'_, Postgres>, dedup_key: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "INSERT INTO processed_records (subscriber_name, dedup_key) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(SUBSCRIBER_NAME)
        .bind(dedup_key)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl EventHandler<AccountAggregate> for AccountsProjection {
    fn name(&self) -> &'static str {
        SUBSCRIBER_NAME
    }

    async fn handle(&self, event: &StoreEvent<AccountEvent>) -> Result<(), StoreError> {
        let dedup_key = format!("account:{}", event.global_sequence);
        let mut tx = self.pool.begin().await?;

        if !self.mark_processed(&mut tx, &dedup_key).await? {
            return Ok(tx.commit().await?);
        }

        match event.payload() {
            AccountEvent::Opened { name, currency } => {
                self.create(&mut tx, event.aggregate_id, name, currency, event.occurred_on).await?
            }
            AccountEvent::MoneyDeposited { currency, amount, .. } => {
                self.apply_delta(&mut tx, event.aggregate_id, currency, *amount).await?
            }
            AccountEvent::MoneyWithdrawn { currency, amount, .. } => {
                self.apply_delta(&mut tx, event.aggregate_id, currency, -*amount).await?
            }
            AccountEvent::Closed => self.close(&mut tx, event.aggregate_id, event.occurred_on).await?,
            AccountEvent::NameUpdated { name } => self.rename(&mut tx, event.aggregate_id, name).await?,
        }

        Ok(tx.commit().await?)
    }
}

#[async_trait]
impl EventHandler<TransactionAggregate> for AccountsProjection {
    fn name(&self) -> &'static str {
        SUBSCRIBER_NAME
    }

    async fn handle(&self, event: &StoreEvent<TransactionEvent>) -> Result<(), StoreError> {
        let dedup_key = format!("transaction:{}", event.global_sequence);
        let mut tx = self.pool.begin().await?;

        if !self.mark_processed(&mut tx, &dedup_key).await? {
            return Ok(tx.commit().await?);
        }

        match event.payload() {
            TransactionEvent::MoneySpent { account_id, currency, amount, .. } => {
                self.apply_delta(&mut tx, *account_id, currency, -*amount).await?
            }
            TransactionEvent::MoneyReceived { account_id, currency, amount, .. } => {
                self.apply_delta(&mut tx, *account_id, currency, *amount).await?
            }
            TransactionEvent::MoneyTransfered {
                from_account_id,
                from_currency,
                from_amount,
                to_account_id,
                to_currency,
                to_amount,
                ..
            } => {
                self.apply_delta(&mut tx, *from_account_id, from_currency, -*from_amount).await?;
                self.apply_delta(&mut tx, *to_account_id, to_currency, *to_amount).await?;
            }
            TransactionEvent::ReimbursementReceived { account_id, currency, amount, .. } => {
                self.apply_delta(&mut tx, *account_id, currency, *amount).await?
            }
            TransactionEvent::MoneyDeposited { account_id, currency, amount, .. } => {
                self.apply_delta(&mut tx, *account_id, currency, *amount).await?
            }
            TransactionEvent::MoneyWithdrawn { account_id, currency, amount, .. } => {
                self.apply_delta(&mut tx, *account_id, currency, -*amount).await?
            }
            TransactionEvent::ExpectedReimbursementSet { account_id, currency, amount } => {
                self.set_expected_reimbursement(&mut tx, *account_id, currency, *amount).await?
            }
            TransactionEvent::Deleted => {}
        }

        Ok(tx.commit().await?)
    }
}
