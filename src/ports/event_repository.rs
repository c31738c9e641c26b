//! Event repository port.
//!
//! `sold` is never written by `save` on an existing row; the only way to
//! move it is `compare_and_set_sold`, which the inventory ledger drives.

use async_trait::async_trait;

use crate::domain::event::Event;
use crate::domain::foundation::{DomainError, EventId};

use super::WriteOutcome;

/// Repository port for Event persistence.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Insert a new event.
    ///
    /// # Errors
    ///
    /// - `Conflict` if the id already exists
    /// - `DatabaseError` on persistence failure
    async fn save(&self, event: &Event) -> Result<(), DomainError>;

    /// Find an event by id.
    async fn find_by_id(&self, id: &EventId) -> Result<Option<Event>, DomainError>;

    /// List events that are on sale, ordered by date ascending then id.
    ///
    /// The ordering is total so the same data always yields the same listing.
    async fn list_on_sale(&self, limit: usize) -> Result<Vec<Event>, DomainError>;

    /// Atomically set `sold = new` iff it currently equals `expected`.
    ///
    /// # Errors
    ///
    /// - `EventNotFound` if the event does not exist
    /// - `DatabaseError` on persistence failure
    async fn compare_and_set_sold(
        &self,
        id: &EventId,
        expected: u32,
        new: u32,
    ) -> Result<WriteOutcome, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn EventRepository) {}
    }
}
