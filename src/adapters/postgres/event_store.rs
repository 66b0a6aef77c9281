use crate::domain::events::DomainEvent;
use crate::ports::event_store::{EventStore as EventStoreTrait, Result};
use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use sqlx::{PgPool, Row};
use uuid::Uuid;

/// PostgreSQL implementation of EventStore
///
/// Stores domain events of every aggregate in one append-only log.
/// Events are serialized as JSONB.
pub struct EventStore {
    pool: PgPool,
}

impl EventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventStoreTrait for EventStore {
    /// Append events to the event store
    ///
    /// All events of one call are written in a single transaction with
    /// consecutive aggregate versions. The unique (aggregate_id, aggregate_version)
    /// constraint rejects a concurrent writer that read the same version.
    async fn append(&self, aggregate_id: Uuid, events: Vec<DomainEvent>) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        let current_version: i32 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(MAX(aggregate_version), 0)
            FROM events
            WHERE aggregate_id = $1
            "#,
        )
        .bind(aggregate_id)
        .fetch_one(&mut *tx)
        .await?;

        let mut versions = Vec::with_capacity(events.len());
        let mut aggregate_types = Vec::with_capacity(events.len());
        let mut event_types = Vec::with_capacity(events.len());
        let mut event_data_list = Vec::with_capacity(events.len());
        let mut occurred_at_list = Vec::with_capacity(events.len());

        for (i, event) in events.iter().enumerate() {
            versions.push(current_version + (i as i32) + 1);
            aggregate_types.push(event.aggregate_type());
            event_types.push(event.event_type());
            event_data_list.push(serde_json::to_value(event)?);
            occurred_at_list.push(event.occurred_at());
        }

        sqlx::query(
            r#"
            INSERT INTO events (
                aggregate_id,
                aggregate_version,
                aggregate_type,
                event_type,
                event_data,
                occurred_at
            )
            SELECT $1, * FROM UNNEST($2::int[], $3::varchar[], $4::varchar[], $5::jsonb[], $6::timestamptz[])
            "#,
        )
        .bind(aggregate_id)
        .bind(&versions)
        .bind(&aggregate_types)
        .bind(&event_types)
        .bind(&event_data_list)
        .bind(&occurred_at_list)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn load(&self, aggregate_id: Uuid) -> Result<Vec<DomainEvent>> {
        let rows = sqlx::query(
            r#"
            SELECT event_data
            FROM events
            WHERE aggregate_id = $1
            ORDER BY aggregate_version ASC
            "#,
        )
        .bind(aggregate_id)
        .fetch_all(&self.pool)
        .await?;

        let mut events = Vec::with_capacity(rows.len());
        for row in rows {
            let event_data: serde_json::Value = row.get("event_data");
            events.push(serde_json::from_value(event_data)?);
        }

        Ok(events)
    }

    /// Stream every event ordered by sequence_number
    fn stream_all(&self) -> BoxStream<'_, Result<DomainEvent>> {
        let stream = sqlx::query(
            r#"
            SELECT event_data
            FROM events
            ORDER BY sequence_number ASC
            "#,
        )
        .fetch(&self.pool)
        .map(|row_result| {
            let row = row_result?;
            let event_data: serde_json::Value = row.get("event_data");
            let event: DomainEvent = serde_json::from_value(event_data)
                .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)?;
            Ok(event)
        });

        Box::pin(stream)
    }
}
