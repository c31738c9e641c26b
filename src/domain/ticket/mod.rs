//! Ticket domain module.
//!
//! # Module Structure
//!
//! - `aggregate` - Ticket aggregate and admission outcome
//! - `status` - TicketStatus state machine
//! - `code` - Human-presentable ticket codes

mod aggregate;
mod code;
mod status;

pub use aggregate::{Admission, Ticket};
pub use code::TicketCode;
pub use status::TicketStatus;
