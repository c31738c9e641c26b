//! EventTix - ticket and payment transaction engine
//!
//! Sells event tickets over a REST API and a USSD menu, collects payment
//! through a mobile money gateway, and admits ticket holders at the venue.
//! Inventory is held in a per-event sold counter updated by compare-and-set.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
