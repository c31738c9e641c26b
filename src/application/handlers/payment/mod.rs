//! Payment confirmation: gateway webhooks and status polling.

mod reconcile_payment;
mod sync_payment_status;

pub use reconcile_payment::{ReconcilePaymentCommand, ReconcilePaymentHandler};
pub use sync_payment_status::{SyncPaymentStatusCommand, SyncPaymentStatusHandler};
