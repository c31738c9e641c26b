//! Event domain module.
//!
//! # Module Structure
//!
//! - `aggregate` - Event aggregate with immutable capacity
//! - `status` - EventStatus
//! - `inventory` - Capacity arithmetic backing the inventory ledger

mod aggregate;
mod inventory;
mod status;

pub use aggregate::Event;
pub use inventory::{
    next_sold_after_release, next_sold_after_reserve, CapacityExceeded, ReservationToken,
};
pub use status::EventStatus;
