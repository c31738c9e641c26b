//! Ticket aggregate.
//!
//! A ticket is one purchase line: `quantity` admissions to one event at a
//! price frozen when the ticket was created.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    DomainError, ErrorCode, EventId, Money, OwnedByUser, StateMachine, TicketId, Timestamp,
    UserId, ValidationError,
};

use super::{TicketCode, TicketStatus};

/// Result of attempting to admit a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The ticket transitioned to `used` now.
    Admitted,
    /// The ticket was already used; `used_at` is untouched.
    AlreadyUsed { used_at: Option<Timestamp> },
}

/// Ticket aggregate.
///
/// # Invariants
///
/// - `quantity >= 1`
/// - `price == unit_price * quantity` at creation, never recomputed
/// - `used_at` is set exactly once, on the `paid → used` transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub event_id: EventId,

    /// Purchaser and owner.
    pub owner_id: UserId,

    pub code: TicketCode,
    pub quantity: u32,

    /// Total price, frozen at purchase.
    pub price: Money,

    pub status: TicketStatus,
    pub used_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Ticket {
    /// Creates a pending ticket, freezing `price = unit_price * quantity`.
    pub fn issue(
        id: TicketId,
        event_id: EventId,
        owner_id: UserId,
        code: TicketCode,
        quantity: u32,
        unit_price: Money,
    ) -> Result<Self, ValidationError> {
        if quantity == 0 {
            return Err(ValidationError::out_of_range(
                "quantity",
                1,
                i64::from(u32::MAX),
                0,
            ));
        }
        let price = unit_price.times(quantity)?;
        let now = Timestamp::now();

        Ok(Self {
            id,
            event_id,
            owner_id,
            code,
            quantity,
            price,
            status: TicketStatus::Pending,
            used_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Returns true if the ticket can be admitted right now.
    pub fn is_admissible(&self) -> bool {
        self.status == TicketStatus::Paid && self.used_at.is_none()
    }

    /// Marks the ticket paid after its payment settled successfully.
    ///
    /// # Errors
    ///
    /// `InvalidStateTransition` unless the ticket is pending.
    pub fn mark_paid(&mut self) -> Result<(), DomainError> {
        self.transition_to(TicketStatus::Paid)?;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Admits the ticket at the venue.
    ///
    /// A second admission is reported as `AlreadyUsed` without mutation.
    ///
    /// # Errors
    ///
    /// `InvalidStateTransition` for pending, cancelled or refunded tickets.
    pub fn mark_used(&mut self, at: Timestamp) -> Result<Admission, DomainError> {
        if self.status == TicketStatus::Used {
            return Ok(Admission::AlreadyUsed {
                used_at: self.used_at,
            });
        }
        self.transition_to(TicketStatus::Used)?;
        self.used_at = Some(at);
        self.updated_at = at;
        Ok(Admission::Admitted)
    }

    /// Withdraws an unpaid ticket.
    ///
    /// # Errors
    ///
    /// `InvalidStateTransition` unless the ticket is pending.
    pub fn cancel(&mut self) -> Result<(), DomainError> {
        self.transition_to(TicketStatus::Cancelled)?;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Withdraws a paid, unused ticket.
    ///
    /// # Errors
    ///
    /// `InvalidStateTransition` unless the ticket is paid.
    pub fn refund(&mut self) -> Result<(), DomainError> {
        self.transition_to(TicketStatus::Refunded)?;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    fn transition_to(&mut self, target: TicketStatus) -> Result<(), DomainError> {
        self.status = self.status.transition_to(target).map_err(|_| {
            DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!(
                    "Cannot transition ticket from {} to {}",
                    self.status, target
                ),
            )
            .with_detail("ticket_id", self.id.to_string())
            .with_detail("from", self.status.as_str())
            .with_detail("to", target.as_str())
        })?;
        Ok(())
    }
}

impl OwnedByUser for Ticket {
    fn owner_id(&self) -> &UserId {
        &self.owner_id
    }
}
