//! Request and response bodies for the ticketing API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::SettlementReport;
use crate::application::handlers::{TicketPass, VerificationVerdict};
use crate::domain::foundation::{EventId, PaymentId, TicketId};
use crate::domain::payment::Payment;
use crate::domain::ticket::Ticket;

#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseRequest {
    pub event_id: EventId,
    pub quantity: u32,
    /// Number to charge. Defaults to the caller's registered phone.
    #[serde(default)]
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyTicketRequest {
    pub code: String,
    pub event_id: EventId,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PassParams {
    /// `png` returns the raw image instead of JSON.
    #[serde(default)]
    pub format: Option<String>,
}

/// Callback fields as posted by the USSD aggregator.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UssdRequest {
    pub session_id: String,
    #[serde(default)]
    pub service_code: String,
    pub phone_number: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketView {
    pub id: TicketId,
    pub event_id: EventId,
    pub code: String,
    pub quantity: u32,
    /// Decimal string, e.g. `"40.00"`.
    pub price: String,
    pub price_minor: i64,
    pub status: String,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&Ticket> for TicketView {
    fn from(ticket: &Ticket) -> Self {
        Self {
            id: ticket.id,
            event_id: ticket.event_id,
            code: ticket.code.to_string(),
            quantity: ticket.quantity,
            price: ticket.price.to_decimal_string(),
            price_minor: ticket.price.minor_units(),
            status: ticket.status.to_string(),
            used_at: ticket.used_at.map(|t| *t.as_datetime()),
            created_at: *ticket.created_at.as_datetime(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentView {
    pub id: PaymentId,
    pub ticket_id: TicketId,
    pub amount: String,
    pub amount_minor: i64,
    pub status: String,
    pub channel: String,
    pub external_reference: Option<String>,
}

impl From<&Payment> for PaymentView {
    fn from(payment: &Payment) -> Self {
        Self {
            id: payment.id,
            ticket_id: payment.ticket_id,
            amount: payment.amount.to_decimal_string(),
            amount_minor: payment.amount.minor_units(),
            status: payment.status.to_string(),
            channel: payment.channel.to_string(),
            external_reference: payment.external_reference.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseResponse {
    pub ticket: TicketView,
    pub payment: PaymentView,
    pub gateway_status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelTicketResponse {
    pub ticket: TicketView,
    pub released: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyTicketResponse {
    pub valid: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket: Option<TicketView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_at: Option<DateTime<Utc>>,
}

impl From<&VerificationVerdict> for VerifyTicketResponse {
    fn from(verdict: &VerificationVerdict) -> Self {
        let (ticket, used_at) = match verdict {
            VerificationVerdict::Admitted { ticket } => {
                (Some(TicketView::from(ticket.as_ref())), ticket.used_at)
            }
            VerificationVerdict::AlreadyUsed { used_at } => (None, *used_at),
            _ => (None, None),
        };
        Self {
            valid: verdict.is_admitted(),
            message: verdict.message().to_string(),
            ticket,
            used_at: used_at.map(|t| *t.as_datetime()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketPassResponse {
    pub ticket_id: TicketId,
    pub code: String,
    pub content_type: String,
    pub data_uri: String,
}

impl From<&TicketPass> for TicketPassResponse {
    fn from(pass: &TicketPass) -> Self {
        Self {
            ticket_id: pass.ticket_id,
            code: pass.code.to_string(),
            content_type: pass.image.content_type.clone(),
            data_uri: pass.data_uri(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementResponse {
    pub payment_id: PaymentId,
    /// `settled`, `already_settled` or `pending`.
    pub outcome: String,
    pub status: String,
}

impl From<&SettlementReport> for SettlementResponse {
    fn from(report: &SettlementReport) -> Self {
        let (payment_id, outcome, status) = match report {
            SettlementReport::Settled { payment_id, status } => {
                (*payment_id, "settled", status.to_string())
            }
            SettlementReport::AlreadySettled { payment_id, status } => {
                (*payment_id, "already_settled", status.to_string())
            }
            SettlementReport::StillPending { payment_id } => {
                (*payment_id, "pending", "pending".to_string())
            }
        };
        Self {
            payment_id,
            outcome: outcome.to_string(),
            status,
        }
    }
}
