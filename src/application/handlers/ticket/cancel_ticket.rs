//! CancelTicketHandler - withdraws a ticket and returns its inventory.
//!
//! - pending: the payment is cancelled first, then the ticket
//! - paid: the ticket is refunded; the payment stays `success`
//!
//! Either way exactly `ticket.quantity` goes back to the event. The seats are
//! released before the ticket is committed and reserved again if the commit
//! does not apply, so a failed cancellation can always be retried. A pending
//! ticket whose payment has succeeded is marked paid and refunded.

use std::sync::Arc;

use crate::application::InventoryLedger;
use crate::domain::errors::TicketingError;
use crate::domain::foundation::{AuthenticatedUser, Capability, OwnedByUser, TicketId};
use crate::domain::payment::{PaymentStatus, Settlement};
use crate::domain::ticket::{Ticket, TicketStatus};
use crate::ports::{PaymentRepository, TicketRepository, WriteOutcome};

#[derive(Debug, Clone)]
pub struct CancelTicketCommand {
    pub ticket_id: TicketId,
    pub actor: AuthenticatedUser,
}

#[derive(Debug, Clone)]
pub struct CancelTicketResult {
    /// The ticket in its final `cancelled` or `refunded` state.
    pub ticket: Ticket,
    /// Quantity returned to the event's inventory.
    pub released: u32,
}

pub struct CancelTicketHandler {
    tickets: Arc<dyn TicketRepository>,
    payments: Arc<dyn PaymentRepository>,
    ledger: Arc<InventoryLedger>,
}

impl CancelTicketHandler {
    pub fn new(
        tickets: Arc<dyn TicketRepository>,
        payments: Arc<dyn PaymentRepository>,
        ledger: Arc<InventoryLedger>,
    ) -> Self {
        Self {
            tickets,
            payments,
            ledger,
        }
    }

    pub async fn handle(
        &self,
        cmd: CancelTicketCommand,
    ) -> Result<CancelTicketResult, TicketingError> {
        let ticket = self.load(&cmd.ticket_id).await?;

        ticket
            .check_access(&cmd.actor, Capability::CancelAnyTicket)
            .map_err(|e| {
                tracing::warn!(
                    ticket_id = %ticket.id,
                    actor = %cmd.actor.id,
                    "Cancellation refused: not owner"
                );
                TicketingError::from(e)
            })?;

        match ticket.status {
            TicketStatus::Pending => self.cancel_pending(ticket).await,
            TicketStatus::Paid => self.refund_paid(ticket).await,
            _ => Err(rejection(&ticket)),
        }
    }

    async fn cancel_pending(&self, ticket: Ticket) -> Result<CancelTicketResult, TicketingError> {
        if let Some(mut payment) = self.payments.find_by_ticket_id(&ticket.id).await? {
            let payment_status = match payment.mark_cancelled()? {
                Settlement::AlreadySettled(status) => status,
                Settlement::Applied => match self
                    .payments
                    .compare_and_update(&payment, PaymentStatus::Pending)
                    .await?
                {
                    WriteOutcome::Applied => PaymentStatus::Cancelled,
                    WriteOutcome::Conflict => {
                        self.payments
                            .find_by_id(&payment.id)
                            .await?
                            .ok_or_else(|| TicketingError::payment_not_found(payment.id))?
                            .status
                    }
                },
            };

            if payment_status == PaymentStatus::Success {
                return self.refund_after_settlement(&ticket.id).await;
            }
        }

        let mut cancelled = ticket;
        cancelled.cancel()?;
        self.withdraw(&cancelled, TicketStatus::Pending).await?;

        tracing::info!(
            ticket_id = %cancelled.id,
            event_id = %cancelled.event_id,
            released = cancelled.quantity,
            "Ticket cancelled"
        );
        Ok(CancelTicketResult {
            released: cancelled.quantity,
            ticket: cancelled,
        })
    }

    /// The payment succeeded before the ticket was marked paid. The ticket
    /// is brought to `paid` here and then refunded.
    async fn refund_after_settlement(
        &self,
        ticket_id: &TicketId,
    ) -> Result<CancelTicketResult, TicketingError> {
        let current = self.load(ticket_id).await?;
        match current.status {
            TicketStatus::Paid => self.refund_paid(current).await,
            TicketStatus::Pending => {
                let mut paid = current;
                paid.mark_paid()?;
                match self
                    .tickets
                    .compare_and_update(&paid, TicketStatus::Pending)
                    .await?
                {
                    WriteOutcome::Applied => self.refund_paid(paid).await,
                    WriteOutcome::Conflict => Err(TicketingError::conflict(
                        "payment is being confirmed; retry the cancellation",
                    )),
                }
            }
            _ => Err(rejection(&current)),
        }
    }

    async fn refund_paid(&self, ticket: Ticket) -> Result<CancelTicketResult, TicketingError> {
        let mut refunded = ticket;
        refunded.refund()?;
        self.withdraw(&refunded, TicketStatus::Paid).await?;

        tracing::info!(
            ticket_id = %refunded.id,
            event_id = %refunded.event_id,
            released = refunded.quantity,
            "Ticket refunded"
        );
        Ok(CancelTicketResult {
            released: refunded.quantity,
            ticket: refunded,
        })
    }

    /// Releases the ticket's seats, then commits `withdrawn` if the stored
    /// ticket is still `expected`. On any commit failure the seats are
    /// reserved again and the ticket is left as it was.
    async fn withdraw(
        &self,
        withdrawn: &Ticket,
        expected: TicketStatus,
    ) -> Result<(), TicketingError> {
        self.ledger
            .release(&withdrawn.event_id, withdrawn.quantity)
            .await
            .map_err(|e| {
                tracing::error!(
                    ticket_id = %withdrawn.id,
                    event_id = %withdrawn.event_id,
                    quantity = withdrawn.quantity,
                    error = %e,
                    "Failed to release inventory; ticket left unchanged"
                );
                e
            })?;

        let err = match self.tickets.compare_and_update(withdrawn, expected).await {
            Ok(WriteOutcome::Applied) => return Ok(()),
            Ok(WriteOutcome::Conflict) => match self.load(&withdrawn.id).await {
                Ok(current) => {
                    tracing::warn!(
                        ticket_id = %withdrawn.id,
                        status = %current.status,
                        "Ticket changed during cancellation"
                    );
                    rejection(&current)
                }
                Err(e) => e,
            },
            Err(e) => TicketingError::from(e),
        };

        if let Err(e) = self.ledger.reserve(&withdrawn.event_id, withdrawn.quantity).await {
            tracing::error!(
                ticket_id = %withdrawn.id,
                event_id = %withdrawn.event_id,
                quantity = withdrawn.quantity,
                error = %e,
                "Failed to restore inventory after an uncommitted cancellation"
            );
        }
        Err(err)
    }

    async fn load(&self, id: &TicketId) -> Result<Ticket, TicketingError> {
        self.tickets
            .find_by_id(id)
            .await?
            .ok_or_else(|| TicketingError::ticket_not_found(id))
    }
}

fn rejection(ticket: &Ticket) -> TicketingError {
    match ticket.status {
        TicketStatus::Used => TicketingError::invalid_transition("Cannot cancel a used ticket"),
        TicketStatus::Cancelled | TicketStatus::Refunded => {
            TicketingError::invalid_transition("Ticket is already cancelled or refunded")
        }
        TicketStatus::Pending | TicketStatus::Paid => {
            TicketingError::conflict(format!("ticket {} changed concurrently", ticket.id))
        }
    }
}
