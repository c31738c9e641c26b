//! Payment repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, PaymentId, TicketId};
use crate::domain::payment::{Payment, PaymentStatus};

use super::WriteOutcome;

/// Repository port for Payment persistence.
///
/// Implementations must enforce uniqueness of `external_reference` once set
/// and of `ticket_id` (one payment per ticket).
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Insert a new payment.
    ///
    /// # Errors
    ///
    /// - `Conflict` if the id or ticket already has a payment
    /// - `DatabaseError` on persistence failure
    async fn save(&self, payment: &Payment) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, DomainError>;

    async fn find_by_ticket_id(&self, ticket_id: &TicketId)
        -> Result<Option<Payment>, DomainError>;

    /// Lookup used by the webhook reconciler.
    async fn find_by_external_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Payment>, DomainError>;

    /// Persist `payment`'s status, external reference and `updated_at` iff
    /// the stored status still equals `expected`.
    ///
    /// # Errors
    ///
    /// - `PaymentNotFound` if the payment does not exist
    /// - `Conflict` if the external reference belongs to another payment
    /// - `DatabaseError` on persistence failure
    async fn compare_and_update(
        &self,
        payment: &Payment,
        expected: PaymentStatus,
    ) -> Result<WriteOutcome, DomainError>;
}
