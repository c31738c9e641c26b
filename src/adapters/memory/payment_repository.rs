//! In-memory payment repository.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, PaymentId, TicketId};
use crate::domain::payment::{Payment, PaymentStatus};
use crate::ports::{PaymentRepository, WriteOutcome};

#[derive(Default)]
pub struct InMemoryPaymentRepository {
    payments: RwLock<HashMap<PaymentId, Payment>>,
    fail_saves: AtomicBool,
}

impl InMemoryPaymentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `save` fail with a database error.
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub async fn all(&self) -> Vec<Payment> {
        self.payments.read().await.values().cloned().collect()
    }
}

fn reference_taken(payments: &HashMap<PaymentId, Payment>, payment: &Payment) -> bool {
    match &payment.external_reference {
        Some(reference) => payments.values().any(|p| {
            p.id != payment.id && p.external_reference.as_deref() == Some(reference.as_str())
        }),
        None => false,
    }
}

fn duplicate_reference(payment: &Payment) -> DomainError {
    DomainError::new(ErrorCode::Conflict, "External reference already in use")
        .with_detail("payment_id", payment.id.to_string())
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn save(&self, payment: &Payment) -> Result<(), DomainError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(DomainError::database("payment store unavailable"));
        }
        let mut payments = self.payments.write().await;
        if reference_taken(&payments, payment) {
            return Err(duplicate_reference(payment));
        }
        payments.insert(payment.id, payment.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, DomainError> {
        Ok(self.payments.read().await.get(id).cloned())
    }

    async fn find_by_ticket_id(
        &self,
        ticket_id: &TicketId,
    ) -> Result<Option<Payment>, DomainError> {
        Ok(self
            .payments
            .read()
            .await
            .values()
            .find(|p| &p.ticket_id == ticket_id)
            .cloned())
    }

    async fn find_by_external_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Payment>, DomainError> {
        Ok(self
            .payments
            .read()
            .await
            .values()
            .find(|p| p.external_reference.as_deref() == Some(reference))
            .cloned())
    }

    async fn compare_and_update(
        &self,
        payment: &Payment,
        expected: PaymentStatus,
    ) -> Result<WriteOutcome, DomainError> {
        let mut payments = self.payments.write().await;
        if reference_taken(&payments, payment) {
            return Err(duplicate_reference(payment));
        }
        match payments.get_mut(&payment.id) {
            Some(current) if current.status == expected => {
                *current = payment.clone();
                Ok(WriteOutcome::Applied)
            }
            Some(_) => Ok(WriteOutcome::Conflict),
            None => Err(DomainError::new(ErrorCode::PaymentNotFound, "Payment not found")
                .with_detail("payment_id", payment.id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{EventId, Money, PhoneNumber, UserId};
    use crate::domain::payment::PaymentChannel;

    fn payment() -> Payment {
        Payment::open(
            PaymentId::new(),
            EventId::new(),
            TicketId::new(),
            UserId::new(),
            Money::from_units(10, 0).unwrap(),
            PaymentChannel::Gateway,
            PhoneNumber::parse("+15550001111").unwrap(),
            "test",
        )
    }

    #[tokio::test]
    async fn finds_by_external_reference_after_settlement() {
        let repo = InMemoryPaymentRepository::new();
        let mut p = payment();
        repo.save(&p).await.unwrap();

        p.mark_succeeded("TIX_ref").unwrap();
        assert!(repo
            .compare_and_update(&p, PaymentStatus::Pending)
            .await
            .unwrap()
            .is_applied());

        let found = repo.find_by_external_reference("TIX_ref").await.unwrap();
        assert_eq!(found.map(|f| f.status), Some(PaymentStatus::Success));
        assert!(repo.find_by_external_reference("other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn second_settlement_conflicts() {
        let repo = InMemoryPaymentRepository::new();
        let original = payment();
        repo.save(&original).await.unwrap();

        let mut failed = original.clone();
        failed.mark_failed().unwrap();
        let mut cancelled = original.clone();
        cancelled.mark_cancelled().unwrap();

        assert!(repo
            .compare_and_update(&failed, PaymentStatus::Pending)
            .await
            .unwrap()
            .is_applied());
        assert_eq!(
            repo.compare_and_update(&cancelled, PaymentStatus::Pending)
                .await
                .unwrap(),
            WriteOutcome::Conflict
        );
    }

    #[tokio::test]
    async fn external_reference_is_unique() {
        let repo = InMemoryPaymentRepository::new();
        let mut a = payment();
        a.assign_reference("dup").unwrap();
        repo.save(&a).await.unwrap();

        let mut b = payment();
        b.assign_reference("dup").unwrap();
        let err = repo.save(&b).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);
    }
}
