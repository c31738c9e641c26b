//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, roles, errors)
//! - `event` - Event aggregate and capacity arithmetic
//! - `ticket` - Ticket lifecycle and codes
//! - `payment` - Payment lifecycle, gateway notifications, signatures
//! - `ussd` - Stateless USSD navigation and menu text
//! - `errors` - Ticketing error taxonomy returned by handlers

pub mod errors;
pub mod event;
pub mod foundation;
pub mod payment;
pub mod ticket;
pub mod ussd;
