//! Payment aggregate.
//!
//! A payment is linked to exactly one ticket. Settlement methods are
//! idempotent: applying any of them to a settled payment is a no-op that
//! reports the status it already holds.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    DomainError, EventId, Money, OwnedByUser, PaymentId, PhoneNumber, StateMachine, TicketId,
    Timestamp, UserId,
};

use super::{PaymentChannel, PaymentStatus};

/// Outcome of applying a settlement to a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// The payment moved out of `pending` now.
    Applied,
    /// The payment was already terminal; nothing changed.
    AlreadySettled(PaymentStatus),
}

impl Settlement {
    pub fn was_applied(&self) -> bool {
        matches!(self, Settlement::Applied)
    }
}

/// Payment aggregate.
///
/// # Invariants
///
/// - `external_reference` is unique across payments once set, and never
///   changes after it is set
/// - `status == Success` implies `external_reference.is_some()`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub event_id: EventId,
    pub ticket_id: TicketId,
    pub payer_id: UserId,
    pub amount: Money,
    pub status: PaymentStatus,
    pub channel: PaymentChannel,

    /// Gateway correlation key; also the webhook idempotency key.
    pub external_reference: Option<String>,

    pub phone_number: PhoneNumber,
    pub description: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Payment {
    /// Opens a pending payment for a freshly issued ticket.
    #[allow(clippy::too_many_arguments)]
    pub fn open(
        id: PaymentId,
        event_id: EventId,
        ticket_id: TicketId,
        payer_id: UserId,
        amount: Money,
        channel: PaymentChannel,
        phone_number: PhoneNumber,
        description: impl Into<String>,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            event_id,
            ticket_id,
            payer_id,
            amount,
            status: PaymentStatus::Pending,
            channel,
            external_reference: None,
            phone_number,
            description: description.into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.status.is_terminal()
    }

    /// Stores the gateway correlation reference for a pending payment.
    ///
    /// # Errors
    ///
    /// Validation error if the reference is blank or a different one is
    /// already recorded.
    pub fn assign_reference(&mut self, reference: &str) -> Result<(), DomainError> {
        self.accept_reference(reference)?;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Settles the payment as successful, recording the external reference.
    ///
    /// # Errors
    ///
    /// Validation error if the payment is pending and the reference is blank
    /// or conflicts with the recorded one.
    pub fn mark_succeeded(&mut self, reference: &str) -> Result<Settlement, DomainError> {
        if self.is_settled() {
            return Ok(Settlement::AlreadySettled(self.status));
        }
        self.accept_reference(reference)?;
        self.settle(PaymentStatus::Success)
    }

    /// Settles the payment as failed.
    pub fn mark_failed(&mut self) -> Result<Settlement, DomainError> {
        if self.is_settled() {
            return Ok(Settlement::AlreadySettled(self.status));
        }
        self.settle(PaymentStatus::Failed)
    }

    /// Settles the payment as cancelled.
    pub fn mark_cancelled(&mut self) -> Result<Settlement, DomainError> {
        if self.is_settled() {
            return Ok(Settlement::AlreadySettled(self.status));
        }
        self.settle(PaymentStatus::Cancelled)
    }

    fn settle(&mut self, target: PaymentStatus) -> Result<Settlement, DomainError> {
        self.status = self.status.transition_to(target)?;
        self.updated_at = Timestamp::now();
        Ok(Settlement::Applied)
    }

    fn accept_reference(&mut self, reference: &str) -> Result<(), DomainError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(DomainError::validation(
                "external_reference",
                "External reference is required",
            ));
        }
        match &self.external_reference {
            Some(existing) if existing != reference => Err(DomainError::validation(
                "external_reference",
                "Payment already carries a different external reference",
            )
            .with_detail("payment_id", self.id.to_string())),
            Some(_) => Ok(()),
            None => {
                self.external_reference = Some(reference.to_string());
                Ok(())
            }
        }
    }
}

impl OwnedByUser for Payment {
    fn owner_id(&self) -> &UserId {
        &self.payer_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;

    fn pending_payment() -> Payment {
        Payment::open(
            PaymentId::new(),
            EventId::new(),
            TicketId::new(),
            UserId::new(),
            Money::from_units(30, 0).unwrap(),
            PaymentChannel::Gateway,
            PhoneNumber::parse("+233241234567").unwrap(),
            "Payment for 2 ticket(s) - Jazz Night",
        )
    }

    #[test]
    fn open_starts_pending_without_reference() {
        let payment = pending_payment();
        assert_eq!(payment.status, PaymentStatus::Pending);
        assert!(payment.external_reference.is_none());
    }

    #[test]
    fn success_records_reference() {
        let mut payment = pending_payment();
        let outcome = payment.mark_succeeded("TIX_abc_1").unwrap();
        assert_eq!(outcome, Settlement::Applied);
        assert_eq!(payment.status, PaymentStatus::Success);
        assert_eq!(payment.external_reference.as_deref(), Some("TIX_abc_1"));
    }

    #[test]
    fn success_requires_reference() {
        let mut payment = pending_payment();
        let err = payment.mark_succeeded("  ").unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(payment.status, PaymentStatus::Pending);
    }

    #[test]
    fn settled_payment_reports_already_settled() {
        let mut payment = pending_payment();
        payment.mark_succeeded("ref-1").unwrap();
        let before = payment.clone();

        assert_eq!(
            payment.mark_failed().unwrap(),
            Settlement::AlreadySettled(PaymentStatus::Success)
        );
        assert_eq!(
            payment.mark_succeeded("ref-1").unwrap(),
            Settlement::AlreadySettled(PaymentStatus::Success)
        );
        assert_eq!(payment, before);
    }

    #[test]
    fn failed_payment_stays_failed() {
        let mut payment = pending_payment();
        assert!(payment.mark_failed().unwrap().was_applied());
        assert_eq!(
            payment.mark_cancelled().unwrap(),
            Settlement::AlreadySettled(PaymentStatus::Failed)
        );
    }

    #[test]
    fn assigned_reference_cannot_be_replaced() {
        let mut payment = pending_payment();
        payment.assign_reference("TIX_1").unwrap();
        assert!(payment.assign_reference("TIX_1").is_ok());
        assert!(payment.assign_reference("TIX_2").is_err());
        assert!(payment.mark_succeeded("TIX_2").is_err());
    }
}
