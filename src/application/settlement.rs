//! Payment settlement shared by every confirmation path.
//!
//! Gateway webhooks, status polling and USSD confirmation all end here.
//! The payment moves out of `pending` through a status-guarded write, so
//! concurrent duplicates race on one row and exactly one of them applies.
//! A successful payment whose ticket is still pending is finished by any
//! later settlement attempt, so redelivery repairs an interrupted write.

use std::sync::Arc;

use crate::domain::errors::TicketingError;
use crate::domain::foundation::{PaymentId, StateMachine};
use crate::domain::payment::{GatewayOutcome, Payment, PaymentStatus, Settlement};
use crate::domain::ticket::TicketStatus;
use crate::ports::{EventRepository, PaymentRepository, TicketRepository, WriteOutcome};

use super::Notifier;

/// What settling a payment did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettlementReport {
    /// The payment moved from `pending` to `status` now.
    Settled {
        payment_id: PaymentId,
        status: PaymentStatus,
    },
    /// The payment was already terminal. Not an error.
    AlreadySettled {
        payment_id: PaymentId,
        status: PaymentStatus,
    },
    /// The gateway has not decided yet; nothing changed.
    StillPending { payment_id: PaymentId },
}

pub struct PaymentSettler {
    events: Arc<dyn EventRepository>,
    tickets: Arc<dyn TicketRepository>,
    payments: Arc<dyn PaymentRepository>,
    notifier: Notifier,
}

impl PaymentSettler {
    pub fn new(
        events: Arc<dyn EventRepository>,
        tickets: Arc<dyn TicketRepository>,
        payments: Arc<dyn PaymentRepository>,
        notifier: Notifier,
    ) -> Self {
        Self {
            events,
            tickets,
            payments,
            notifier,
        }
    }

    /// Applies a gateway outcome to `payment`.
    ///
    /// On success the linked ticket is marked paid and a confirmation is
    /// dispatched. On failure or cancellation the ticket stays pending.
    pub async fn settle(
        &self,
        mut payment: Payment,
        outcome: GatewayOutcome,
        reference: &str,
    ) -> Result<SettlementReport, TicketingError> {
        let payment_id = payment.id;
        let settlement = match outcome {
            GatewayOutcome::Pending => {
                return if payment.is_settled() {
                    self.confirm_settled(&payment).await
                } else {
                    Ok(SettlementReport::StillPending { payment_id })
                };
            }
            GatewayOutcome::Succeeded => payment.mark_succeeded(reference)?,
            GatewayOutcome::Failed => payment.mark_failed()?,
            GatewayOutcome::Cancelled => payment.mark_cancelled()?,
        };

        if let Settlement::AlreadySettled(status) = settlement {
            tracing::info!(payment_id = %payment_id, status = %status, "Payment already settled");
            return self.confirm_settled(&payment).await;
        }

        match self
            .payments
            .compare_and_update(&payment, PaymentStatus::Pending)
            .await?
        {
            WriteOutcome::Applied => {}
            WriteOutcome::Conflict => {
                let current = self
                    .payments
                    .find_by_id(&payment_id)
                    .await?
                    .ok_or_else(|| TicketingError::payment_not_found(payment_id))?;
                if current.status.is_terminal() {
                    tracing::info!(
                        payment_id = %payment_id,
                        status = %current.status,
                        "Concurrent settlement won the race"
                    );
                    return self.confirm_settled(&current).await;
                }
                return Err(TicketingError::conflict(format!(
                    "payment {} changed while settling",
                    payment_id
                )));
            }
        }

        tracing::info!(
            payment_id = %payment_id,
            ticket_id = %payment.ticket_id,
            status = %payment.status,
            channel = %payment.channel,
            "Payment settled"
        );

        if payment.status == PaymentStatus::Success {
            self.mark_ticket_paid(&payment).await?;
        }

        Ok(SettlementReport::Settled {
            payment_id,
            status: payment.status,
        })
    }

    /// Reports a payment that was already terminal.
    ///
    /// A `success` payment whose ticket is still `pending` has its ticket
    /// marked paid and the confirmation sent here.
    pub async fn confirm_settled(
        &self,
        payment: &Payment,
    ) -> Result<SettlementReport, TicketingError> {
        if payment.status == PaymentStatus::Success {
            self.mark_ticket_paid(payment).await?;
        }
        Ok(SettlementReport::AlreadySettled {
            payment_id: payment.id,
            status: payment.status,
        })
    }

    async fn mark_ticket_paid(&self, payment: &Payment) -> Result<(), TicketingError> {
        let mut ticket = self
            .tickets
            .find_by_id(&payment.ticket_id)
            .await?
            .ok_or_else(|| TicketingError::ticket_not_found(payment.ticket_id))?;

        match ticket.status {
            TicketStatus::Pending => {}
            TicketStatus::Paid | TicketStatus::Used => return Ok(()),
            TicketStatus::Cancelled | TicketStatus::Refunded => {
                tracing::error!(
                    payment_id = %payment.id,
                    ticket_id = %ticket.id,
                    ticket_status = %ticket.status,
                    "Payment succeeded for a withdrawn ticket"
                );
                return Ok(());
            }
        }
        ticket.mark_paid()?;

        if !self
            .tickets
            .compare_and_update(&ticket, TicketStatus::Pending)
            .await?
            .is_applied()
        {
            tracing::debug!(
                payment_id = %payment.id,
                ticket_id = %ticket.id,
                "Ticket marked paid by a concurrent settlement"
            );
            return Ok(());
        }

        tracing::info!(ticket_id = %ticket.id, code = %ticket.code, "Ticket paid");

        match self.events.find_by_id(&ticket.event_id).await {
            Ok(Some(event)) => {
                let message = self.notifier.ticket_confirmed(&event, &ticket);
                self.notifier.dispatch(payment.phone_number.clone(), message);
            }
            Ok(None) => {
                tracing::warn!(event_id = %ticket.event_id, "Event missing; confirmation skipped")
            }
            Err(e) => {
                tracing::warn!(event_id = %ticket.event_id, error = %e, "Confirmation skipped")
            }
        }

        Ok(())
    }
}
