//! Payment gateway port.
//!
//! Hands a pending payment to a mobile-money collection API. `initiate` is
//! called once per payment and never retried automatically; a failure leaves
//! the payment pending with no reference.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::event::Event;
use crate::domain::payment::{GatewayOutcome, Payment};

/// Handle returned by the gateway for a collection request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionHandle {
    /// Correlation reference; later webhooks carry it.
    pub reference: String,

    /// Status string reported by the gateway at initiation.
    pub status: String,
}

/// Errors from gateway calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("gateway unreachable: {0}")]
    Network(String),

    #[error("gateway rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("unexpected gateway response: {0}")]
    InvalidResponse(String),

    #[error("request signing failed: {0}")]
    Signing(String),

    #[error("unknown reference: {0}")]
    UnknownReference(String),
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Request collection of `payment.amount` from `payment.phone_number`.
    async fn initiate(&self, payment: &Payment, event: &Event)
        -> Result<CollectionHandle, GatewayError>;

    /// Query the current status of a collection by reference.
    async fn status(&self, reference: &str) -> Result<GatewayOutcome, GatewayError>;
}
