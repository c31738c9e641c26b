//! Event aggregate.
//!
//! # Design Decisions
//!
//! - **Capacity is immutable**: set at creation, never edited through this type
//! - **`sold` is ledger-owned**: only the inventory ledger writes it, through a
//!   compare-and-set on the repository
//! - **Money in cents**: `unit_price` is a `Money` in minor units

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{EventId, Money, Timestamp, UserId, ValidationError};

use super::EventStatus;

/// A ticketed event.
///
/// # Invariants
///
/// - `0 <= sold <= capacity`
/// - `capacity > 0`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub description: String,

    /// When the event takes place.
    pub date: Timestamp,
    pub location: String,
    pub category: Option<String>,

    /// Price of a single admission.
    pub unit_price: Money,

    /// Total admissions available. Never changes after creation.
    pub capacity: u32,

    /// Admissions currently reserved or sold.
    pub sold: u32,

    pub status: EventStatus,
    pub organizer_id: UserId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Event {
    /// Creates a new event with nothing sold.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty title or zero capacity.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: EventId,
        title: impl Into<String>,
        description: impl Into<String>,
        date: Timestamp,
        location: impl Into<String>,
        unit_price: Money,
        capacity: u32,
        status: EventStatus,
        organizer_id: UserId,
    ) -> Result<Self, ValidationError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ValidationError::empty_field("title"));
        }
        if capacity == 0 {
            return Err(ValidationError::out_of_range(
                "capacity",
                1,
                i64::from(u32::MAX),
                0,
            ));
        }

        let now = Timestamp::now();
        Ok(Self {
            id,
            title,
            description: description.into(),
            date,
            location: location.into(),
            category: None,
            unit_price,
            capacity,
            sold: 0,
            status,
            organizer_id,
            created_at: now,
            updated_at: now,
        })
    }

    /// Admissions still available.
    pub fn available(&self) -> u32 {
        self.capacity.saturating_sub(self.sold)
    }

    /// Returns true if the event is in a purchasable status.
    pub fn is_on_sale(&self) -> bool {
        self.status.accepts_purchases()
    }
}
