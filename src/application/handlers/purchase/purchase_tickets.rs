//! PurchaseTicketsHandler - Command handler for buying tickets.
//!
//! Reserves inventory first, then records a pending ticket and a pending
//! payment. A failure after the reservation gives the inventory back, so a
//! purchase either completes or leaves `sold` where it found it.
//!
//! Gateway purchases end with the payment handed to the collection API and
//! waiting for a webhook. USSD purchases are confirmed in the dialog itself
//! and settle before this handler returns.

use std::sync::Arc;

use crate::application::{InventoryLedger, PaymentSettler};
use crate::domain::errors::TicketingError;
use crate::domain::event::{Event, ReservationToken};
use crate::domain::foundation::{
    EventId, PaymentId, PhoneNumber, TicketId, Timestamp, UserId,
};
use crate::domain::payment::{GatewayOutcome, Payment, PaymentChannel, PaymentStatus};
use crate::domain::ticket::{Ticket, TicketCode, TicketStatus};
use crate::ports::{
    EventRepository, PaymentGateway, PaymentRepository, TicketRepository, WriteOutcome,
};

/// Command to buy `quantity` admissions to one event.
#[derive(Debug, Clone)]
pub struct PurchaseTicketsCommand {
    pub event_id: EventId,
    pub quantity: u32,
    pub purchaser_id: UserId,
    /// Number charged by the gateway and notified on confirmation.
    pub phone_number: PhoneNumber,
    pub channel: PaymentChannel,
}

/// Result of a purchase.
#[derive(Debug, Clone)]
pub struct PurchaseTicketsResult {
    pub ticket: Ticket,
    pub payment: Payment,
    /// Status reported by the gateway at initiation. `None` for USSD.
    pub gateway_status: Option<String>,
}

pub struct PurchaseTicketsHandler {
    events: Arc<dyn EventRepository>,
    tickets: Arc<dyn TicketRepository>,
    payments: Arc<dyn PaymentRepository>,
    ledger: Arc<InventoryLedger>,
    gateway: Arc<dyn PaymentGateway>,
    settler: Arc<PaymentSettler>,
}

impl PurchaseTicketsHandler {
    pub fn new(
        events: Arc<dyn EventRepository>,
        tickets: Arc<dyn TicketRepository>,
        payments: Arc<dyn PaymentRepository>,
        ledger: Arc<InventoryLedger>,
        gateway: Arc<dyn PaymentGateway>,
        settler: Arc<PaymentSettler>,
    ) -> Self {
        Self {
            events,
            tickets,
            payments,
            ledger,
            gateway,
            settler,
        }
    }

    pub async fn handle(
        &self,
        cmd: PurchaseTicketsCommand,
    ) -> Result<PurchaseTicketsResult, TicketingError> {
        if cmd.quantity == 0 {
            return Err(TicketingError::validation(
                "quantity",
                "Quantity must be at least 1",
            ));
        }

        // 1. Event must exist and be on sale
        let event = self
            .events
            .find_by_id(&cmd.event_id)
            .await?
            .ok_or_else(|| TicketingError::event_not_found(cmd.event_id))?;

        if !event.status.accepts_purchases() {
            tracing::warn!(
                event_id = %event.id,
                status = %event.status,
                "Purchase rejected: event not on sale"
            );
            return Err(TicketingError::EventNotAvailable {
                event_id: event.id,
                status: event.status.to_string(),
            });
        }

        // 2. Reserve inventory
        let token = self
            .ledger
            .reserve(&event.id, cmd.quantity)
            .await
            .map_err(|e| {
                tracing::warn!(
                    event_id = %event.id,
                    quantity = cmd.quantity,
                    error = %e,
                    "Reservation refused"
                );
                e
            })?;

        // 3. Pending ticket at the current unit price
        let ticket = match self.issue_ticket(&event, &cmd).await {
            Ok(ticket) => ticket,
            Err(e) => {
                self.release(token).await;
                return Err(e);
            }
        };

        // 4. Pending payment linked to the ticket
        let payment = match self.open_payment(&event, &ticket, &cmd).await {
            Ok(payment) => payment,
            Err(e) => {
                self.withdraw(ticket).await;
                self.release(token).await;
                return Err(e);
            }
        };

        tracing::info!(
            event_id = %event.id,
            ticket_id = %ticket.id,
            payment_id = %payment.id,
            quantity = ticket.quantity,
            amount = %payment.amount,
            channel = %payment.channel,
            "Tickets reserved"
        );

        // 5. Hand off for confirmation
        match cmd.channel {
            PaymentChannel::Gateway => self.initiate_collection(&event, ticket, payment).await,
            PaymentChannel::Ussd => self.confirm_in_dialog(ticket, payment).await,
        }
    }

    async fn issue_ticket(
        &self,
        event: &Event,
        cmd: &PurchaseTicketsCommand,
    ) -> Result<Ticket, TicketingError> {
        let ticket = Ticket::issue(
            TicketId::new(),
            event.id,
            cmd.purchaser_id,
            TicketCode::generate(Timestamp::now()),
            cmd.quantity,
            event.unit_price,
        )
        .map_err(|e| TicketingError::validation("ticket", e.to_string()))?;
        self.tickets.save(&ticket).await?;
        Ok(ticket)
    }

    async fn open_payment(
        &self,
        event: &Event,
        ticket: &Ticket,
        cmd: &PurchaseTicketsCommand,
    ) -> Result<Payment, TicketingError> {
        let description = match cmd.channel {
            PaymentChannel::Gateway => {
                format!("Payment for {} ticket(s) - {}", ticket.quantity, event.title)
            }
            PaymentChannel::Ussd => format!("USSD payment for {}", event.title),
        };
        let payment = Payment::open(
            PaymentId::new(),
            event.id,
            ticket.id,
            cmd.purchaser_id,
            ticket.price,
            cmd.channel,
            cmd.phone_number.clone(),
            description,
        );
        self.payments.save(&payment).await?;
        Ok(payment)
    }

    async fn initiate_collection(
        &self,
        event: &Event,
        ticket: Ticket,
        mut payment: Payment,
    ) -> Result<PurchaseTicketsResult, TicketingError> {
        let handle = self.gateway.initiate(&payment, event).await.map_err(|e| {
            tracing::warn!(
                payment_id = %payment.id,
                ticket_id = %ticket.id,
                error = %e,
                "Gateway initiation failed; payment left pending"
            );
            TicketingError::external("payment gateway", e.to_string())
        })?;

        payment.assign_reference(&handle.reference)?;
        match self
            .payments
            .compare_and_update(&payment, PaymentStatus::Pending)
            .await?
        {
            WriteOutcome::Applied => {}
            WriteOutcome::Conflict => {
                tracing::warn!(
                    payment_id = %payment.id,
                    "Payment settled before its reference was stored"
                );
                if let Some(current) = self.payments.find_by_id(&payment.id).await? {
                    payment = current;
                }
            }
        }

        tracing::info!(
            payment_id = %payment.id,
            reference = %handle.reference,
            gateway_status = %handle.status,
            "Payment handed to gateway"
        );

        Ok(PurchaseTicketsResult {
            ticket,
            payment,
            gateway_status: Some(handle.status),
        })
    }

    async fn confirm_in_dialog(
        &self,
        ticket: Ticket,
        payment: Payment,
    ) -> Result<PurchaseTicketsResult, TicketingError> {
        let reference = format!("USSD_{}_{}", payment.id, Timestamp::now().as_unix_secs());
        self.settler
            .settle(payment.clone(), GatewayOutcome::Succeeded, &reference)
            .await?;

        let ticket = self
            .tickets
            .find_by_id(&ticket.id)
            .await?
            .ok_or_else(|| TicketingError::ticket_not_found(ticket.id))?;
        let payment = self
            .payments
            .find_by_id(&payment.id)
            .await?
            .ok_or_else(|| TicketingError::payment_not_found(payment.id))?;

        Ok(PurchaseTicketsResult {
            ticket,
            payment,
            gateway_status: None,
        })
    }

    async fn release(&self, token: ReservationToken) {
        if let Err(e) = self.ledger.release_reservation(token).await {
            tracing::error!(
                event_id = %token.event_id,
                quantity = token.quantity,
                error = %e,
                "Failed to release reservation after purchase failure"
            );
        }
    }

    async fn withdraw(&self, mut ticket: Ticket) {
        if ticket.cancel().is_err() {
            return;
        }
        match self
            .tickets
            .compare_and_update(&ticket, TicketStatus::Pending)
            .await
        {
            Ok(WriteOutcome::Applied) => {}
            Ok(WriteOutcome::Conflict) => {
                tracing::error!(ticket_id = %ticket.id, "Orphaned ticket changed concurrently")
            }
            Err(e) => {
                tracing::error!(ticket_id = %ticket.id, error = %e, "Failed to cancel orphaned ticket")
            }
        }
    }
}
