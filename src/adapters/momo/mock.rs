//! Scripted payment gateway.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::event::Event;
use crate::domain::foundation::PaymentId;
use crate::domain::payment::{GatewayOutcome, Payment};
use crate::ports::{CollectionHandle, GatewayError, PaymentGateway};

/// Accepts every collection request with reference `MOCK_<payment id>`
/// unless told to fail. Status queries answer from a script, defaulting
/// to pending for known references.
#[derive(Debug, Default)]
pub struct MockPaymentGateway {
    fail_with: Option<GatewayError>,
    initiated: Mutex<Vec<PaymentId>>,
    outcomes: Mutex<HashMap<String, GatewayOutcome>>,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(error: GatewayError) -> Self {
        Self {
            fail_with: Some(error),
            ..Self::default()
        }
    }

    pub fn reference_for(payment_id: &PaymentId) -> String {
        format!("MOCK_{}", payment_id)
    }

    /// Scripts the answer for status queries on `reference`.
    pub async fn set_outcome(&self, reference: impl Into<String>, outcome: GatewayOutcome) {
        self.outcomes.lock().await.insert(reference.into(), outcome);
    }

    pub async fn initiated(&self) -> Vec<PaymentId> {
        self.initiated.lock().await.clone()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn initiate(
        &self,
        payment: &Payment,
        _event: &Event,
    ) -> Result<CollectionHandle, GatewayError> {
        if let Some(error) = &self.fail_with {
            return Err(error.clone());
        }
        self.initiated.lock().await.push(payment.id);
        let reference = Self::reference_for(&payment.id);
        self.outcomes
            .lock()
            .await
            .entry(reference.clone())
            .or_insert(GatewayOutcome::Pending);
        Ok(CollectionHandle {
            reference,
            status: "PENDING".to_string(),
        })
    }

    async fn status(&self, reference: &str) -> Result<GatewayOutcome, GatewayError> {
        if let Some(error) = &self.fail_with {
            return Err(error.clone());
        }
        self.outcomes
            .lock()
            .await
            .get(reference)
            .copied()
            .ok_or_else(|| GatewayError::UnknownReference(reference.to_string()))
    }
}
