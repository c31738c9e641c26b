//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Shared services used by several handlers live here:
//!
//! - `InventoryLedger` - compare-and-set reservations against event capacity
//! - `PaymentSettler` - the single path by which a payment becomes terminal
//! - `Notifier` - fire-and-forget SMS after commit

pub mod handlers;
mod inventory_ledger;
mod notifications;
mod settlement;

#[cfg(test)]
pub(crate) mod testing;

pub use inventory_ledger::InventoryLedger;
pub use notifications::Notifier;
pub use settlement::{PaymentSettler, SettlementReport};
