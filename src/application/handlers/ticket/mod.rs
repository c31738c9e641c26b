//! Ticket commands after purchase: cancellation, admission, passes.

mod cancel_ticket;
mod get_ticket_pass;
mod verify_ticket;

pub use cancel_ticket::{CancelTicketCommand, CancelTicketHandler, CancelTicketResult};
pub use get_ticket_pass::{GetTicketPassHandler, GetTicketPassQuery, TicketPass};
pub use verify_ticket::{VerificationVerdict, VerifyTicketCommand, VerifyTicketHandler};
