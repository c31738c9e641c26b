//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations, one file
//! per command, grouped by the aggregate they start from.

pub mod payment;
pub mod purchase;
pub mod ticket;
pub mod ussd;

pub use payment::{
    ReconcilePaymentCommand, ReconcilePaymentHandler, SyncPaymentStatusCommand,
    SyncPaymentStatusHandler,
};
pub use purchase::{PurchaseTicketsCommand, PurchaseTicketsHandler, PurchaseTicketsResult};
pub use ticket::{
    CancelTicketCommand, CancelTicketHandler, CancelTicketResult, GetTicketPassHandler,
    GetTicketPassQuery, TicketPass, VerificationVerdict, VerifyTicketCommand, VerifyTicketHandler,
};
pub use ussd::{
    HandleUssdRequestCommand, HandleUssdRequestHandler, HandleUssdRequestResult, UssdSettings,
};
