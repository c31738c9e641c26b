//! In-memory event repository.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::event::Event;
use crate::domain::foundation::{DomainError, ErrorCode, EventId, Timestamp};
use crate::ports::{EventRepository, WriteOutcome};

#[derive(Default)]
pub struct InMemoryEventRepository {
    events: RwLock<HashMap<EventId, Event>>,
    fail_writes: AtomicBool,
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an event, replacing any event with the same id.
    pub async fn insert(&self, event: Event) {
        self.events.write().await.insert(event.id, event);
    }

    /// Makes every subsequent `compare_and_set_sold` fail with a database error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Current `sold` count, if the event exists.
    pub async fn sold(&self, id: &EventId) -> Option<u32> {
        self.events.read().await.get(id).map(|e| e.sold)
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn save(&self, event: &Event) -> Result<(), DomainError> {
        self.events.write().await.insert(event.id, event.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &EventId) -> Result<Option<Event>, DomainError> {
        Ok(self.events.read().await.get(id).cloned())
    }

    async fn list_on_sale(&self, limit: usize) -> Result<Vec<Event>, DomainError> {
        let events = self.events.read().await;
        let mut on_sale: Vec<Event> = events
            .values()
            .filter(|e| e.status.accepts_purchases())
            .cloned()
            .collect();
        on_sale.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        on_sale.truncate(limit);
        Ok(on_sale)
    }

    async fn compare_and_set_sold(
        &self,
        id: &EventId,
        expected: u32,
        new: u32,
    ) -> Result<WriteOutcome, DomainError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::database("event store unavailable"));
        }
        let mut events = self.events.write().await;
        let event = events.get_mut(id).ok_or_else(|| {
            DomainError::new(ErrorCode::EventNotFound, "Event not found")
                .with_detail("event_id", id.to_string())
        })?;

        if event.sold != expected {
            return Ok(WriteOutcome::Conflict);
        }
        event.sold = new;
        event.updated_at = Timestamp::now();
        Ok(WriteOutcome::Applied)
    }
}
