use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use sqlx::{PgPool, Row};
use tokio::sync::{watch, RwLock};
use uuid::Uuid;

use crate::aggregate::Aggregate;
use crate::error::StoreError;
use crate::event::StoreEvent;
use crate::handler::EventHandler;
use crate::sql::statements;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);
const DEFAULT_BATCH_SIZE: i64 = 10;

/// Polls one aggregate type's outbox table and delivers each row to every registered
/// [`EventHandler`], deleting the row only once all of them have acknowledged it —
/// an at-least-once, multi-consumer-safe relay.
///
/// Subscribers are stored behind an `Arc<RwLock<Vec<_>>>` and the list is cloned out before
/// each batch is delivered (copy-on-iterate), so registering a new handler never blocks, and
/// never races, an in-flight delivery.
pub struct OutboxRelay<A> {
    pool: PgPool,
    handlers: Arc<RwLock<Vec<Arc<dyn EventHandler<A>>>>>,
    poll_interval: Duration,
    batch_size: i64,
    _aggregate: PhantomData<A>,
}

impl<A> OutboxRelay<A>
where
    A: Aggregate,
    A::Event: serde::de::DeserializeOwned,
{
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            handlers: Arc::new(RwLock::new(Vec::new())),
            poll_interval: DEFAULT_POLL_INTERVAL,
            batch_size: DEFAULT_BATCH_SIZE,
            _aggregate: PhantomData,
        }
    }

    pub async fn register(&self, handler: Arc<dyn EventHandler<A>>) {
        self.handlers.write().await.push(handler);
    }

    /// Runs the poll loop until `shutdown` is signalled (changed to `true`).
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(error) = self.drain_batch().await {
                        tracing::error!(aggregate = A::NAME, %error, "outbox drain failed");
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        tracing::info!(aggregate = A::NAME, "outbox relay shutting down");
                        return;
                    }
                }
            }
        }
    }

    #[tracing::instrument(skip(self), fields(aggregate = A::NAME))]
    async fn drain_batch(&self) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let rows = sqlx::query(&statements::select_outbox_batch(A::NAME))
            .bind(self.batch_size)
            .fetch_all(&mut *tx)
            .await?;

        if rows.is_empty() {
            tx.commit().await?;
            return Ok(());
        }

        let handlers: Vec<Arc<dyn EventHandler<A>>> = self.handlers.read().await.iter().cloned().collect();

        for row in rows {
            let outbox_id: Uuid = row.try_get("id")?;
            let payload: serde_json::Value = row.try_get("payload")?;
            let event = StoreEvent::<A::Event> {
                id: row.try_get("event_id")?,
                aggregate_id: row.try_get("aggregate_id")?,
                payload: serde_json::from_value(payload)?,
                version: row.try_get("version")?,
                global_sequence: row.try_get("global_sequence")?,
                occurred_on: row.try_get("occurred_on")?,
            };

            let mut all_acked = true;
            for handler in handlers.iter() {
                if let Err(error) = handler.handle(&event).await {
                    all_acked = false;
                    tracing::error!(handler = handler.name(), %error, "event handler failed, will redeliver");
                }
            }

            if all_acked {
                sqlx::query(&statements::delete_outbox_row(A::NAME))
                    .bind(outbox_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }
}
