//! In-memory adapters.
//!
//! Back the repository ports with `tokio` locks. Used by tests.

mod event_repository;
mod payment_repository;
mod ticket_repository;
mod user_directory;

pub use event_repository::InMemoryEventRepository;
pub use payment_repository::InMemoryPaymentRepository;
pub use ticket_repository::InMemoryTicketRepository;
pub use user_directory::InMemoryUserDirectory;
