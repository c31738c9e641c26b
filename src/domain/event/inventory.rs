//! Pure capacity arithmetic for the inventory ledger.
//!
//! The application-level ledger performs the atomic compare-and-set against
//! storage; this module decides what the next `sold` value may be.

use thiserror::Error;

use crate::domain::foundation::EventId;

/// Proof that `quantity` admissions were reserved on an event.
///
/// Handed back to `release` when a purchase has to compensate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a reservation must be turned into a ticket or released"]
pub struct ReservationToken {
    pub event_id: EventId,
    pub quantity: u32,

    /// Value of `sold` right after this reservation committed.
    pub sold_after: u32,
}

/// The requested quantity does not fit in the remaining capacity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("event {event_id} has {available} admissions left, {requested} requested")]
pub struct CapacityExceeded {
    pub event_id: EventId,
    pub requested: u32,
    pub available: u32,
}

/// Computes `sold + quantity`, refusing to exceed `capacity`.
pub fn next_sold_after_reserve(
    event_id: EventId,
    sold: u32,
    capacity: u32,
    quantity: u32,
) -> Result<u32, CapacityExceeded> {
    let available = capacity.saturating_sub(sold);
    if quantity > available {
        return Err(CapacityExceeded {
            event_id,
            requested: quantity,
            available,
        });
    }
    Ok(sold + quantity)
}

/// Computes `sold - quantity`, floored at zero.
pub fn next_sold_after_release(sold: u32, quantity: u32) -> u32 {
    sold.saturating_sub(quantity)
}
