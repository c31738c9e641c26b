//! Payment domain module.
//!
//! # Module Structure
//!
//! - `aggregate` - Payment aggregate and idempotent settlement
//! - `status` - PaymentStatus state machine and PaymentChannel
//! - `notification` - Inbound gateway callback payload
//! - `signature` - HMAC signing and webhook verification

mod aggregate;
mod notification;
mod signature;
mod status;

pub use aggregate::{Payment, Settlement};
pub use notification::{GatewayNotification, GatewayOutcome};
pub use signature::{sign_body, WebhookError, WebhookSignatureVerifier, SIGNATURE_HEADER};
pub use status::{PaymentChannel, PaymentStatus};
