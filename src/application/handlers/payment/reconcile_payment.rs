//! ReconcilePaymentHandler - applies gateway webhooks.
//!
//! The webhook body is authenticated (when a secret is configured), parsed,
//! and matched to a payment by its external reference. A reference that
//! matches nothing is rejected; payments are never created here. Replays of
//! an already applied webhook report `AlreadySettled` and change nothing.

use std::sync::Arc;

use crate::application::{PaymentSettler, SettlementReport};
use crate::domain::errors::TicketingError;
use crate::domain::payment::{GatewayNotification, WebhookSignatureVerifier};
use crate::ports::PaymentRepository;

/// Raw webhook delivery.
#[derive(Debug, Clone)]
pub struct ReconcilePaymentCommand {
    pub payload: Vec<u8>,
    /// `X-Signature` header value, if present.
    pub signature: Option<String>,
}

pub struct ReconcilePaymentHandler {
    payments: Arc<dyn PaymentRepository>,
    settler: Arc<PaymentSettler>,
    verifier: Option<WebhookSignatureVerifier>,
}

impl ReconcilePaymentHandler {
    pub fn new(payments: Arc<dyn PaymentRepository>, settler: Arc<PaymentSettler>) -> Self {
        Self {
            payments,
            settler,
            verifier: None,
        }
    }

    /// Requires every delivery to carry a valid HMAC-SHA256 signature.
    pub fn with_verifier(mut self, verifier: WebhookSignatureVerifier) -> Self {
        self.verifier = Some(verifier);
        self
    }

    pub async fn handle(
        &self,
        cmd: ReconcilePaymentCommand,
    ) -> Result<SettlementReport, TicketingError> {
        if let Some(verifier) = &self.verifier {
            verifier
                .verify(&cmd.payload, cmd.signature.as_deref())
                .map_err(|e| {
                    tracing::warn!(error = %e, "Webhook signature rejected");
                    TicketingError::from(e)
                })?;
        }

        let notification: GatewayNotification =
            serde_json::from_slice(&cmd.payload).map_err(|e| {
                tracing::warn!(error = %e, "Malformed webhook payload");
                TicketingError::validation("payload", e.to_string())
            })?;

        self.apply(notification).await
    }

    /// Applies an already authenticated notification.
    pub async fn apply(
        &self,
        notification: GatewayNotification,
    ) -> Result<SettlementReport, TicketingError> {
        let reference = notification.reference.trim();
        if reference.is_empty() {
            return Err(TicketingError::validation(
                "reference",
                "Webhook reference is required",
            ));
        }

        let payment = self
            .payments
            .find_by_external_reference(reference)
            .await?
            .ok_or_else(|| {
                tracing::warn!(reference, "Webhook for unknown payment reference");
                TicketingError::payment_not_found(reference)
            })?;

        tracing::info!(
            payment_id = %payment.id,
            reference,
            gateway_status = %notification.status,
            transaction_id = notification.transaction_id.as_deref().unwrap_or(""),
            "Webhook received"
        );

        self.settler
            .settle(payment, notification.outcome(), reference)
            .await
    }
}
