//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the ticketing domain.

mod auth;
mod errors;
mod ids;
mod money;
mod ownership;
mod phone;
mod role;
mod state_machine;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{EventId, PaymentId, TicketId, UserId};
pub use money::Money;
pub use ownership::OwnedByUser;
pub use phone::PhoneNumber;
pub use role::{Capability, Role};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
