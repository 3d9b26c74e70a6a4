use std::marker::PhantomData;

use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::aggregate::Aggregate;
use crate::error::StoreError;
use crate::event::StoreEvent;
use crate::sql::statements;
use crate::store::EventStore;
use crate::types::Version;

/// Durable, Postgres-backed [`EventStore`]. Owns a pair of tables per aggregate type —
/// `{A::NAME}_events` and `{A::NAME}_outbox` — and appends to both inside one
/// `sqlx::Transaction`, so a crash between the two inserts is impossible: either both rows
/// land, or neither does.
///
/// `(aggregate_id, version)` carries a unique index; a conflicting insert surfaces as
/// Postgres error code `23505`, which `append` maps to [`StoreError::VersionConflict`].
pub struct PgEventStore<A> {
    pool: PgPool,
    _aggregate: PhantomData<A>,
}

impl<A> PgEventStore<A>
where
    A: Aggregate,
{
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _aggregate: PhantomData,
        }
    }

    /// Creates the events/outbox tables and indexes for this aggregate type if they don't
    /// already exist. Idempotent — safe to call on every process start.
    #[tracing::instrument(skip_all, fields(aggregate = A::NAME))]
    pub async fn setup(&self) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        for statement in statements::migration_statements(A::NAME) {
            sqlx::query(&statement).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl<A> EventStore<A> for PgEventStore<A>
where
    A: Aggregate,
    A::Event: serde::Serialize + serde::de::DeserializeOwned,
{
    #[tracing::instrument(skip_all, fields(aggregate = A::NAME, %aggregate_id))]
    async fn by_aggregate_id(&self, aggregate_id: Uuid) -> Result<Vec<StoreEvent<A::Event>>, StoreError> {
        let mut stream = sqlx::query(&statements::select_by_aggregate_id(A::NAME))
            .bind(aggregate_id)
            .fetch(&self.pool);

        let mut events = Vec::new();
        while let Some(row) = stream.try_next().await? {
            let payload: serde_json::Value = row.try_get("payload")?;
            events.push(StoreEvent {
                id: row.try_get("id")?,
                aggregate_id: row.try_get("aggregate_id")?,
                payload: serde_json::from_value(payload)?,
                version: row.try_get("version")?,
                global_sequence: row.try_get("global_sequence")?,
                occurred_on: row.try_get("occurred_on")?,
            });
        }
        Ok(events)
    }

    #[tracing::instrument(skip_all, fields(aggregate = A::NAME, %aggregate_id, expected_version))]
    async fn append(
        &self,
        aggregate_id: Uuid,
        expected_version: Version,
        event: A::Event,
    ) -> Result<StoreEvent<A::Event>, StoreError> {
        let next_version = expected_version + 1;
        let payload = serde_json::to_value(&event)?;
        let event_id = Uuid::new_v4();

        let mut tx = self.pool.begin().await.map_err(StoreError::Sql)?;

        let insert = sqlx::query(&statements::insert_event(A::NAME))
            .bind(event_id)
            .bind(aggregate_id)
            .bind(&payload)
            .bind(next_version)
            .execute(&mut *tx)
            .await;

        let row = match insert {
            Ok(_) => sqlx::query(&statements::select_one(A::NAME))
                .bind(event_id)
                .fetch_one(&mut *tx)
                .await?,
            Err(sqlx::Error::Database(ref db_err)) if db_err.code().as_deref() == Some("23505") => {
                tracing::warn!("version conflict appending to {}", A::NAME);
                return Err(StoreError::VersionConflict {
                    expected: expected_version,
                    actual: next_version,
                });
            }
            Err(err) => return Err(StoreError::Sql(err)),
        };

        sqlx::query(&statements::insert_outbox(A::NAME))
            .bind(Uuid::new_v4())
            .bind(event_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(StoreEvent {
            id: row.try_get("id")?,
            aggregate_id: row.try_get("aggregate_id")?,
            payload: event,
            version: row.try_get("version")?,
            global_sequence: row.try_get("global_sequence")?,
            occurred_on: row.try_get("occurred_on")?,
        })
    }
}
