//! In-memory ticket repository.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, TicketId, UserId};
use crate::domain::ticket::{Ticket, TicketCode, TicketStatus};
use crate::ports::{TicketRepository, WriteOutcome};

#[derive(Default)]
pub struct InMemoryTicketRepository {
    tickets: RwLock<HashMap<TicketId, Ticket>>,
    fail_saves: AtomicBool,
    fail_next_update: AtomicBool,
}

impl InMemoryTicketRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `save` fail with a database error.
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Makes the next `compare_and_update` fail with a database error.
    pub fn fail_next_update(&self) {
        self.fail_next_update.store(true, Ordering::SeqCst);
    }

    pub async fn insert(&self, ticket: Ticket) {
        self.tickets.write().await.insert(ticket.id, ticket);
    }

    pub async fn all(&self) -> Vec<Ticket> {
        self.tickets.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl TicketRepository for InMemoryTicketRepository {
    async fn save(&self, ticket: &Ticket) -> Result<(), DomainError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(DomainError::database("ticket store unavailable"));
        }
        let mut tickets = self.tickets.write().await;
        if tickets
            .values()
            .any(|t| t.code == ticket.code && t.id != ticket.id)
        {
            return Err(DomainError::new(ErrorCode::Conflict, "Duplicate ticket code")
                .with_detail("code", ticket.code.to_string()));
        }
        tickets.insert(ticket.id, ticket.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &TicketId) -> Result<Option<Ticket>, DomainError> {
        Ok(self.tickets.read().await.get(id).cloned())
    }

    async fn find_by_code(&self, code: &TicketCode) -> Result<Option<Ticket>, DomainError> {
        Ok(self
            .tickets
            .read()
            .await
            .values()
            .find(|t| &t.code == code)
            .cloned())
    }

    async fn list_recent_by_owner(
        &self,
        owner_id: &UserId,
        limit: usize,
    ) -> Result<Vec<Ticket>, DomainError> {
        let tickets = self.tickets.read().await;
        let mut owned: Vec<Ticket> = tickets
            .values()
            .filter(|t| &t.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        owned.truncate(limit);
        Ok(owned)
    }

    async fn compare_and_update(
        &self,
        ticket: &Ticket,
        expected: TicketStatus,
    ) -> Result<WriteOutcome, DomainError> {
        if self.fail_next_update.swap(false, Ordering::SeqCst) {
            return Err(DomainError::database("ticket store unavailable"));
        }
        let mut tickets = self.tickets.write().await;
        match tickets.get_mut(&ticket.id) {
            Some(current) if current.status == expected => {
                *current = ticket.clone();
                Ok(WriteOutcome::Applied)
            }
            Some(_) => Ok(WriteOutcome::Conflict),
            None => Err(DomainError::new(ErrorCode::TicketNotFound, "Ticket not found")
                .with_detail("ticket_id", ticket.id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{EventId, Money, Timestamp};

    fn ticket(owner: UserId) -> Ticket {
        Ticket::issue(
            TicketId::new(),
            EventId::new(),
            owner,
            TicketCode::generate(Timestamp::now()),
            1,
            Money::from_units(5, 0).unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn status_guarded_update_rejects_stale_writer() {
        let repo = InMemoryTicketRepository::new();
        let original = ticket(UserId::new());
        repo.save(&original).await.unwrap();

        let mut paid = original.clone();
        paid.mark_paid().unwrap();
        let mut cancelled = original.clone();
        cancelled.cancel().unwrap();

        assert!(repo
            .compare_and_update(&paid, TicketStatus::Pending)
            .await
            .unwrap()
            .is_applied());
        assert_eq!(
            repo.compare_and_update(&cancelled, TicketStatus::Pending)
                .await
                .unwrap(),
            WriteOutcome::Conflict
        );
        let stored = repo.find_by_id(&original.id).await.unwrap().unwrap();
        assert_eq!(stored.status, TicketStatus::Paid);
    }

    #[tokio::test]
    async fn injected_update_failure_applies_once() {
        let repo = InMemoryTicketRepository::new();
        let original = ticket(UserId::new());
        repo.save(&original).await.unwrap();
        let mut paid = original.clone();
        paid.mark_paid().unwrap();

        repo.fail_next_update();
        let err = repo
            .compare_and_update(&paid, TicketStatus::Pending)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(repo
            .compare_and_update(&paid, TicketStatus::Pending)
            .await
            .unwrap()
            .is_applied());
    }

    #[tokio::test]
    async fn finds_by_code() {
        let repo = InMemoryTicketRepository::new();
        let t = ticket(UserId::new());
        repo.save(&t).await.unwrap();
        let found = repo.find_by_code(&t.code).await.unwrap();
        assert_eq!(found.map(|f| f.id), Some(t.id));
    }

    #[tokio::test]
    async fn failing_saves_surface_database_error() {
        let repo = InMemoryTicketRepository::new();
        repo.fail_saves(true);
        let err = repo.save(&ticket(UserId::new())).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }
}
