//! HTTP adapter for the ticketing endpoints.
//!
//! - `POST /api/purchases`
//! - `POST /api/tickets/:id/cancel`
//! - `POST /api/tickets/verify`
//! - `GET /api/tickets/:id/pass`
//! - `POST /api/payments/:id/sync`
//! - `POST /api/webhooks/momo`
//! - `POST /api/ussd`
//! - `GET /health`

pub mod dto;
mod handlers;
mod routes;

pub use handlers::TicketingAppState;
pub use routes::ticketing_router;
