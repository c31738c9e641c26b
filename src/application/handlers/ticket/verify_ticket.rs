//! VerifyTicketHandler - admits tickets at the venue door.
//!
//! Staff scan a ticket code for the event they are running. Only a paid,
//! unused ticket for that event is admitted; every other case yields a
//! verdict the door staff can act on. Admission marks the ticket `used`
//! exactly once.

use std::sync::Arc;

use crate::application::Notifier;
use crate::domain::errors::TicketingError;
use crate::domain::foundation::{AuthenticatedUser, Capability, EventId, Timestamp};
use crate::domain::ticket::{Admission, Ticket, TicketCode, TicketStatus};
use crate::ports::{EventRepository, PaymentRepository, TicketRepository, WriteOutcome};

#[derive(Debug, Clone)]
pub struct VerifyTicketCommand {
    /// Code as scanned or typed; surrounding whitespace is ignored.
    pub code: String,
    pub event_id: EventId,
    pub actor: AuthenticatedUser,
}

/// Outcome of a verification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationVerdict {
    Admitted { ticket: Box<Ticket> },
    InvalidCode,
    WrongEvent,
    PaymentPending,
    AlreadyUsed { used_at: Option<Timestamp> },
    NotValid { status: TicketStatus },
}

impl VerificationVerdict {
    pub fn is_admitted(&self) -> bool {
        matches!(self, VerificationVerdict::Admitted { .. })
    }

    pub fn message(&self) -> &'static str {
        match self {
            VerificationVerdict::Admitted { .. } => "Ticket verified successfully",
            VerificationVerdict::InvalidCode => "Invalid ticket code",
            VerificationVerdict::WrongEvent => "Ticket is not valid for this event",
            VerificationVerdict::PaymentPending => "Ticket payment is pending",
            VerificationVerdict::AlreadyUsed { .. } => "Ticket has already been used",
            VerificationVerdict::NotValid { .. } => "Ticket is not valid",
        }
    }
}

pub struct VerifyTicketHandler {
    events: Arc<dyn EventRepository>,
    tickets: Arc<dyn TicketRepository>,
    payments: Arc<dyn PaymentRepository>,
    notifier: Notifier,
}

impl VerifyTicketHandler {
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

    pub async fn handle(
        &self,
        cmd: VerifyTicketCommand,
    ) -> Result<VerificationVerdict, TicketingError> {
        cmd.actor.require(Capability::VerifyTickets)?;

        let Ok(code) = TicketCode::parse(&cmd.code) else {
            return Ok(VerificationVerdict::InvalidCode);
        };
        let Some(mut ticket) = self.tickets.find_by_code(&code).await? else {
            tracing::info!(code = %code, "Verification of unknown ticket code");
            return Ok(VerificationVerdict::InvalidCode);
        };

        if ticket.event_id != cmd.event_id {
            return Ok(VerificationVerdict::WrongEvent);
        }

        match ticket.status {
            TicketStatus::Paid => {}
            TicketStatus::Pending => return Ok(VerificationVerdict::PaymentPending),
            TicketStatus::Used => {
                return Ok(VerificationVerdict::AlreadyUsed {
                    used_at: ticket.used_at,
                })
            }
            status @ (TicketStatus::Cancelled | TicketStatus::Refunded) => {
                return Ok(VerificationVerdict::NotValid { status })
            }
        }

        if let Admission::AlreadyUsed { used_at } = ticket.mark_used(Timestamp::now())? {
            return Ok(VerificationVerdict::AlreadyUsed { used_at });
        }

        if let WriteOutcome::Conflict = self
            .tickets
            .compare_and_update(&ticket, TicketStatus::Paid)
            .await?
        {
            let current = self
                .tickets
                .find_by_id(&ticket.id)
                .await?
                .ok_or_else(|| TicketingError::ticket_not_found(ticket.id))?;
            tracing::warn!(ticket_id = %ticket.id, status = %current.status, "Ticket changed during admission");
            return Ok(match current.status {
                TicketStatus::Used => VerificationVerdict::AlreadyUsed {
                    used_at: current.used_at,
                },
                status => VerificationVerdict::NotValid { status },
            });
        }

        tracing::info!(
            ticket_id = %ticket.id,
            event_id = %ticket.event_id,
            verified_by = %cmd.actor.id,
            "Ticket admitted"
        );

        self.notify_admitted(&ticket).await;

        Ok(VerificationVerdict::Admitted {
            ticket: Box::new(ticket),
        })
    }

    async fn notify_admitted(&self, ticket: &Ticket) {
        let event = match self.events.find_by_id(&ticket.event_id).await {
            Ok(Some(event)) => event,
            _ => return,
        };
        match self.payments.find_by_ticket_id(&ticket.id).await {
            Ok(Some(payment)) => {
                let message = self.notifier.ticket_admitted(&event, ticket);
                self.notifier.dispatch(payment.phone_number, message);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(ticket_id = %ticket.id, error = %e, "Admission notice skipped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::purchase::{PurchaseTicketsCommand, PurchaseTicketsResult};
    use crate::application::testing::{phone, user, Harness};
    use crate::domain::event::Event;
    use crate::domain::foundation::{Role, UserId};
    use crate::domain::payment::PaymentChannel;

    async fn buy(h: &Harness, event: &Event, channel: PaymentChannel) -> PurchaseTicketsResult {
        h.purchase_handler()
            .handle(PurchaseTicketsCommand {
                event_id: event.id,
                quantity: 1,
                purchaser_id: UserId::new(),
                phone_number: phone(),
                channel,
            })
            .await
            .unwrap()
    }

    fn handler(h: &Harness) -> VerifyTicketHandler {
        VerifyTicketHandler::new(
            h.events.clone(),
            h.tickets.clone(),
            h.payments.clone(),
            h.notifier(),
        )
    }

    fn verify(code: &str, event_id: EventId) -> VerifyTicketCommand {
        VerifyTicketCommand {
            code: code.to_string(),
            event_id,
            actor: user(Role::Organizer),
        }
    }

    #[tokio::test]
    async fn paid_ticket_is_admitted_once() {
        let h = Harness::new();
        let event = h.seed_event(10, 0).await;
        let bought = buy(&h, &event, PaymentChannel::Ussd).await;
        let code = bought.ticket.code.to_string();

        let first = handler(&h).handle(verify(&code, event.id)).await.unwrap();
        assert!(first.is_admitted());
        let stored = h.tickets.find_by_id(&bought.ticket.id).await.unwrap().unwrap();
        assert_eq!(stored.status, TicketStatus::Used);
        let used_at = stored.used_at;
        assert!(used_at.is_some());

        let second = handler(&h).handle(verify(&code, event.id)).await.unwrap();
        assert_eq!(second, VerificationVerdict::AlreadyUsed { used_at });
        assert_eq!(second.message(), "Ticket has already been used");
        let again = h.tickets.find_by_id(&bought.ticket.id).await.unwrap().unwrap();
        assert_eq!(again.used_at, used_at);
    }

    #[tokio::test]
    async fn admission_sends_notice() {
        let h = Harness::new();
        let event = h.seed_event(10, 0).await;
        let bought = buy(&h, &event, PaymentChannel::Ussd).await;
        h.wait_for_sms(1).await;

        handler(&h)
            .handle(verify(bought.ticket.code.as_str(), event.id))
            .await
            .unwrap();

        let sent = h.wait_for_sms(2).await;
        assert_eq!(sent.len(), 2);
        assert!(sent[1].1.contains("has been admitted to Jazz Night"));
    }

    #[tokio::test]
    async fn pending_ticket_is_not_admitted() {
        let h = Harness::new();
        let event = h.seed_event(10, 0).await;
        let bought = buy(&h, &event, PaymentChannel::Gateway).await;

        let verdict = handler(&h)
            .handle(verify(bought.ticket.code.as_str(), event.id))
            .await
            .unwrap();
        assert_eq!(verdict, VerificationVerdict::PaymentPending);
        assert_eq!(verdict.message(), "Ticket payment is pending");
    }

    #[tokio::test]
    async fn ticket_for_another_event_is_rejected() {
        let h = Harness::new();
        let event = h.seed_event(10, 0).await;
        let bought = buy(&h, &event, PaymentChannel::Ussd).await;

        let verdict = handler(&h)
            .handle(verify(bought.ticket.code.as_str(), EventId::new()))
            .await
            .unwrap();
        assert_eq!(verdict, VerificationVerdict::WrongEvent);
    }

    #[tokio::test]
    async fn unknown_or_malformed_code_is_invalid() {
        let h = Harness::new();
        let event = h.seed_event(10, 0).await;

        for code in ["garbage", "TIX-20250101120000-deadbeef"] {
            let verdict = handler(&h).handle(verify(code, event.id)).await.unwrap();
            assert_eq!(verdict, VerificationVerdict::InvalidCode);
            assert_eq!(verdict.message(), "Invalid ticket code");
        }
    }

    #[tokio::test]
    async fn cancelled_ticket_is_not_valid() {
        let h = Harness::new();
        let event = h.seed_event(10, 0).await;
        let bought = buy(&h, &event, PaymentChannel::Gateway).await;
        let mut cancelled = bought.ticket.clone();
        cancelled.cancel().unwrap();
        h.tickets.insert(cancelled).await;

        let verdict = handler(&h)
            .handle(verify(bought.ticket.code.as_str(), event.id))
            .await
            .unwrap();
        assert_eq!(
            verdict,
            VerificationVerdict::NotValid {
                status: TicketStatus::Cancelled
            }
        );
    }

    #[tokio::test]
    async fn plain_users_cannot_verify() {
        let h = Harness::new();
        let event = h.seed_event(10, 0).await;
        let err = handler(&h)
            .handle(VerifyTicketCommand {
                code: "TIX-20250101120000-deadbeef".into(),
                event_id: event.id,
                actor: user(Role::User),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, TicketingError::Forbidden(_)));
    }
}
