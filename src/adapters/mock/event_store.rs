use crate::domain::events::DomainEvent;
use crate::ports::event_store::{EventStore as EventStoreTrait, Result};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use std::sync::Mutex;
use uuid::Uuid;

/// In-memory implementation of EventStore
///
/// Keeps every appended event in one ordered log, mirroring the
/// sequence_number ordering of the PostgreSQL store.
pub struct EventStore {
    log: Mutex<Vec<(Uuid, DomainEvent)>>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            log: Mutex::new(Vec::new()),
        }
    }
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventStoreTrait for EventStore {
    async fn append(&self, aggregate_id: Uuid, events: Vec<DomainEvent>) -> Result<()> {
        let mut log = self.log.lock().map_err(|e| e.to_string())?;
        log.extend(events.into_iter().map(|event| (aggregate_id, event)));
        Ok(())
    }

    async fn load(&self, aggregate_id: Uuid) -> Result<Vec<DomainEvent>> {
        let log = self.log.lock().map_err(|e| e.to_string())?;
        Ok(log
            .iter()
            .filter(|(id, _)| *id == aggregate_id)
            .map(|(_, event)| event.clone())
            .collect())
    }

    fn stream_all(&self) -> BoxStream<'_, Result<DomainEvent>> {
        let snapshot: Vec<Result<DomainEvent>> = match self.log.lock() {
            Ok(log) => log.iter().map(|(_, event)| Ok(event.clone())).collect(),
            Err(e) => vec![Err(e.to_string().into())],
        };
        stream::iter(snapshot).boxed()
    }
}
