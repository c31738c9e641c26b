//! Ticket purchase.

mod purchase_tickets;

pub use purchase_tickets::{PurchaseTicketsCommand, PurchaseTicketsHandler, PurchaseTicketsResult};
