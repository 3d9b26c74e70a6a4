use sqlx::{PgPool, Postgres, Transaction};

use crate::error::StoreError;

/// Tables shared across aggregate types: the dedup ledger every [`crate::handler::EventHandler`]
/// writes into, and the accounts balance projection itself.
fn global_statements() -> Vec<&'static str> {
    vec![
        "CREATE TABLE IF NOT EXISTS processed_records (
            subscriber_name text NOT NULL,
            dedup_key text NOT NULL,
            processed_at timestamptz NOT NULL DEFAULT now(),
            PRIMARY KEY (subscriber_name, dedup_key)
        )",
        "CREATE TABLE IF NOT EXISTS accounts_projection (
            id uuid PRIMARY KEY,
            name text,
            balance jsonb NOT NULL DEFAULT '{}',
            expected_reimbursements jsonb NOT NULL DEFAULT '{}',
            created_at timestamptz,
            closed_at timestamptz
        )",
    ]
}

/// Runs every migration this crate needs: the per-aggregate events/outbox tables for
/// `account` and `transaction`, plus the shared `processed_records`/`accounts_projection`
/// tables. Idempotent, safe to call on every process start.
pub async fn run(pool: &PgPool) -> Result<(), StoreError> {
    let mut tx: Transaction<Postgres> = pool.begin().await?;

    for statement in crate::sql::statements::migration_statements("account") {
        sqlx::query(&statement).execute(&mut *tx).await?;
    }
    for statement in crate::sql::statements::migration_statements("transaction") {
        sqlx::query(&statement).execute(&mut *tx).await?;
    }
    for statement in global_statements() {
        sqlx::query(statement).execute(&mut *tx).await?;
    }

    tx.commit().await?;
    Ok(())
}
