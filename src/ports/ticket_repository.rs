//! Ticket repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, TicketId, UserId};
use crate::domain::ticket::{Ticket, TicketCode, TicketStatus};

use super::WriteOutcome;

/// Repository port for Ticket persistence.
///
/// Implementations must enforce a unique ticket code.
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Insert a new ticket.
    ///
    /// # Errors
    ///
    /// - `Conflict` if the id or code already exists
    /// - `DatabaseError` on persistence failure
    async fn save(&self, ticket: &Ticket) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &TicketId) -> Result<Option<Ticket>, DomainError>;

    async fn find_by_code(&self, code: &TicketCode) -> Result<Option<Ticket>, DomainError>;

    /// Most recent tickets first.
    async fn list_recent_by_owner(
        &self,
        owner_id: &UserId,
        limit: usize,
    ) -> Result<Vec<Ticket>, DomainError>;

    /// Persist `ticket`'s status, `used_at` and `updated_at` iff the stored
    /// status still equals `expected`.
    ///
    /// # Errors
    ///
    /// - `TicketNotFound` if the ticket does not exist
    /// - `DatabaseError` on persistence failure
    async fn compare_and_update(
        &self,
        ticket: &Ticket,
        expected: TicketStatus,
    ) -> Result<WriteOutcome, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn TicketRepository) {}
    }
}
