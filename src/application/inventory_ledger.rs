//! Inventory ledger.
//!
//! Owns every mutation of `Event.sold`. A reservation is an optimistic
//! read / compute / compare-and-set loop against the event repository, so
//! concurrent reservations on one event serialize at the storage row and
//! `sold` never exceeds capacity.

use std::sync::Arc;

use crate::domain::errors::TicketingError;
use crate::domain::event::{next_sold_after_release, next_sold_after_reserve, ReservationToken};
use crate::domain::foundation::EventId;
use crate::ports::{EventRepository, WriteOutcome};

/// Compare-and-set attempts before giving up.
const MAX_ATTEMPTS: u32 = 128;

pub struct InventoryLedger {
    events: Arc<dyn EventRepository>,
}

impl InventoryLedger {
    pub fn new(events: Arc<dyn EventRepository>) -> Self {
        Self { events }
    }

    /// Atomically adds `quantity` to the event's `sold` count.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` for a zero quantity
    /// - `EventNotFound` if the event does not exist
    /// - `NotEnoughTickets` if capacity would be exceeded
    /// - `Conflict` if contention outlasted the retry budget
    pub async fn reserve(
        &self,
        event_id: &EventId,
        quantity: u32,
    ) -> Result<ReservationToken, TicketingError> {
        if quantity == 0 {
            return Err(TicketingError::validation(
                "quantity",
                "Quantity must be at least 1",
            ));
        }

        for attempt in 1..=MAX_ATTEMPTS {
            let event = self
                .events
                .find_by_id(event_id)
                .await?
                .ok_or_else(|| TicketingError::event_not_found(event_id))?;

            let next = next_sold_after_reserve(*event_id, event.sold, event.capacity, quantity)?;

            match self
                .events
                .compare_and_set_sold(event_id, event.sold, next)
                .await?
            {
                WriteOutcome::Applied => {
                    tracing::debug!(
                        event_id = %event_id,
                        quantity,
                        sold = next,
                        attempt,
                        "Reserved inventory"
                    );
                    return Ok(ReservationToken {
                        event_id: *event_id,
                        quantity,
                        sold_after: next,
                    });
                }
                WriteOutcome::Conflict => tokio::task::yield_now().await,
            }
        }

        tracing::warn!(event_id = %event_id, quantity, "Reservation gave up under contention");
        Err(TicketingError::conflict(format!(
            "inventory for event {} is under heavy contention",
            event_id
        )))
    }

    /// Subtracts `quantity` from the event's `sold` count, floored at zero.
    ///
    /// # Errors
    ///
    /// - `EventNotFound` if the event does not exist
    /// - `Conflict` if contention outlasted the retry budget
    pub async fn release(&self, event_id: &EventId, quantity: u32) -> Result<(), TicketingError> {
        for _ in 0..MAX_ATTEMPTS {
            let event = self
                .events
                .find_by_id(event_id)
                .await?
                .ok_or_else(|| TicketingError::event_not_found(event_id))?;

            let next = next_sold_after_release(event.sold, quantity);
            if next == event.sold {
                return Ok(());
            }

            if self
                .events
                .compare_and_set_sold(event_id, event.sold, next)
                .await?
                .is_applied()
            {
                tracing::debug!(event_id = %event_id, quantity, sold = next, "Released inventory");
                return Ok(());
            }
            tokio::task::yield_now().await;
        }

        tracing::warn!(event_id = %event_id, quantity, "Release gave up under contention");
        Err(TicketingError::conflict(format!(
            "inventory for event {} is under heavy contention",
            event_id
        )))
    }

    /// Gives back a reservation that never turned into a ticket.
    pub async fn release_reservation(&self, token: ReservationToken) -> Result<(), TicketingError> {
        self.release(&token.event_id, token.quantity).await
    }
}
