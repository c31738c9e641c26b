//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `auth` - JWT session validation
//! - `http` - REST API and USSD callback surface
//! - `memory` - in-memory repositories
//! - `momo` - mobile money payment gateway
//! - `postgres` - PostgreSQL repositories
//! - `qr` - ticket pass rendering
//! - `sms` - notification dispatch

pub mod auth;
pub mod http;
pub mod memory;
pub mod momo;
pub mod postgres;
pub mod qr;
pub mod sms;
