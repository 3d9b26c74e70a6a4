//! SQL text for the per-aggregate-type events/outbox tables.
//!
//! One pair of tables per aggregate type, named from [`crate::aggregate::Aggregate::NAME`] —
//! `account_events`/`account_outbox`, `transaction_events`/`transaction_outbox` — so that
//! global sequencing never crosses aggregate types.

pub fn migration_statements(aggregate_name: &str) -> Vec<String> {
    vec![
        format!(
            "CREATE TABLE IF NOT EXISTS {name}_events (
                id uuid PRIMARY KEY,
                aggregate_id uuid NOT NULL,
                version bigint NOT NULL,
                payload jsonb NOT NULL,
                occurred_on timestamptz NOT NULL DEFAULT now(),
                global_sequence bigserial NOT NULL
            )",
            name = aggregate_name
        ),
        format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {name}_events_aggregate_version
             ON {name}_events (aggregate_id, version)",
            name = aggregate_name
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS {name}_events_aggregate_id
             ON {name}_events (aggregate_id)",
            name = aggregate_name
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {name}_outbox (
                id uuid PRIMARY KEY,
                event_id uuid NOT NULL REFERENCES {name}_events (id),
                created_at timestamptz NOT NULL DEFAULT now()
            )",
            name = aggregate_name
        ),
    ]
}

pub fn select_by_aggregate_id(aggregate_name: &str) -> String {
    format!(
        "SELECT id, aggregate_id, version, payload, occurred_on, global_sequence
         FROM {name}_events WHERE aggregate_id = $1 ORDER BY version ASC",
        name = aggregate_name
    )
}

pub fn select_one(aggregate_name: &str) -> String {
    format!(
        "SELECT id, aggregate_id, version, payload, occurred_on, global_sequence
         FROM {name}_events WHERE id = $1",
        name = aggregate_name
    )
}

pub fn insert_event(aggregate_name: &str) -> String {
    format!(
        "INSERT INTO {name}_events (id, aggregate_id, payload, version)
         VALUES ($1, $2, $3, $4)",
        name = aggregate_name
    )
}

pub fn insert_outbox(aggregate_name: &str) -> String {
    format!(
        "INSERT INTO {name}_outbox (id, event_id) VALUES ($1, $2)",
        name = aggregate_name
    )
}

/// Drains up to `limit` un-relayed rows, oldest first, skipping rows another relay
/// instance already has locked.
pub fn select_outbox_batch(aggregate_name: &str) -> String {
    format!(
        "SELECT o.id, o.event_id, e.aggregate_id, e.version, e.payload, e.occurred_on, e.global_sequence
         FROM {name}_outbox o
         JOIN {name}_events e ON e.id = o.event_id
         ORDER BY e.global_sequence ASC
         LIMIT $1
         FOR UPDATE OF o SKIP LOCKED",
        name = aggregate_name
    )
}

pub fn delete_outbox_row(aggregate_name: &str) -> String {
    format!("DELETE FROM {name}_outbox WHERE id = $1", name = aggregate_name)
}
