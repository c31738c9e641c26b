//! SyncPaymentStatusHandler - polls the gateway for a pending payment.
//!
//! Covers payments whose webhook never arrived. A terminal answer goes
//! through the same settlement path as a webhook, so syncing a payment that
//! a webhook already settled changes nothing beyond finishing a ticket the
//! earlier settlement left pending.

use std::sync::Arc;

use crate::application::{PaymentSettler, SettlementReport};
use crate::domain::errors::TicketingError;
use crate::domain::foundation::{AuthenticatedUser, Capability, OwnedByUser, PaymentId};
use crate::domain::payment::PaymentChannel;
use crate::ports::{GatewayError, PaymentGateway, PaymentRepository};

#[derive(Debug, Clone)]
pub struct SyncPaymentStatusCommand {
    pub payment_id: PaymentId,
    pub actor: AuthenticatedUser,
}

pub struct SyncPaymentStatusHandler {
    payments: Arc<dyn PaymentRepository>,
    gateway: Arc<dyn PaymentGateway>,
    settler: Arc<PaymentSettler>,
}

impl SyncPaymentStatusHandler {
    pub fn new(
        payments: Arc<dyn PaymentRepository>,
        gateway: Arc<dyn PaymentGateway>,
        settler: Arc<PaymentSettler>,
    ) -> Self {
        Self {
            payments,
            gateway,
            settler,
        }
    }

    pub async fn handle(
        &self,
        cmd: SyncPaymentStatusCommand,
    ) -> Result<SettlementReport, TicketingError> {
        let payment = self
            .payments
            .find_by_id(&cmd.payment_id)
            .await?
            .ok_or_else(|| TicketingError::payment_not_found(cmd.payment_id))?;

        payment.check_access(&cmd.actor, Capability::ViewAnyTicket)?;

        if payment.is_settled() {
            return self.settler.confirm_settled(&payment).await;
        }

        if payment.channel != PaymentChannel::Gateway {
            return Err(TicketingError::validation(
                "payment_id",
                "Only gateway payments can be synced",
            ));
        }

        let reference = payment.external_reference.clone().ok_or_else(|| {
            TicketingError::validation(
                "external_reference",
                "Payment was never accepted by the gateway",
            )
        })?;

        let outcome = self.gateway.status(&reference).await.map_err(|e| {
            tracing::warn!(payment_id = %payment.id, reference = %reference, error = %e, "Gateway status query failed");
            match e {
                GatewayError::UnknownReference(_) => {
                    TicketingError::external("payment gateway", "gateway does not know this payment")
                }
                other => TicketingError::external("payment gateway", other.to_string()),
            }
        })?;

        tracing::debug!(payment_id = %payment.id, outcome = ?outcome, "Gateway status fetched");
        self.settler.settle(payment, outcome, &reference).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::purchase::{PurchaseTicketsCommand, PurchaseTicketsResult};
    use crate::application::testing::{phone, user, Harness};
    use crate::domain::foundation::{Role, UserId};
    use crate::domain::payment::{GatewayOutcome, PaymentStatus};
    use crate::domain::ticket::TicketStatus;
    use crate::ports::TicketRepository;

    async fn purchase(h: &Harness, buyer: UserId, channel: PaymentChannel) -> PurchaseTicketsResult {
        let event = h.seed_event(100, 0).await;
        h.purchase_handler()
            .handle(PurchaseTicketsCommand {
                event_id: event.id,
                quantity: 1,
                purchaser_id: buyer,
                phone_number: phone(),
                channel,
            })
            .await
            .unwrap()
    }

    fn handler(h: &Harness) -> SyncPaymentStatusHandler {
        SyncPaymentStatusHandler::new(h.payments.clone(), h.gateway.clone(), h.settler())
    }

    #[tokio::test]
    async fn terminal_gateway_answer_settles_payment() {
        let h = Harness::new();
        let buyer = user(Role::User);
        let bought = purchase(&h, buyer.id, PaymentChannel::Gateway).await;
        let reference = bought.payment.external_reference.clone().unwrap();
        h.gateway.set_outcome(reference, GatewayOutcome::Succeeded).await;

        let report = handler(&h)
            .handle(SyncPaymentStatusCommand {
                payment_id: bought.payment.id,
                actor: buyer,
            })
            .await
            .unwrap();

        assert_eq!(
            report,
            SettlementReport::Settled {
                payment_id: bought.payment.id,
                status: PaymentStatus::Success
            }
        );
        let ticket = h.tickets.find_by_id(&bought.ticket.id).await.unwrap().unwrap();
        assert_eq!(ticket.status, TicketStatus::Paid);
    }

    #[tokio::test]
    async fn pending_gateway_answer_reports_still_pending() {
        let h = Harness::new();
        let staff = user(Role::Admin);
        let bought = purchase(&h, UserId::new(), PaymentChannel::Gateway).await;

        let report = handler(&h)
            .handle(SyncPaymentStatusCommand {
                payment_id: bought.payment.id,
                actor: staff,
            })
            .await
            .unwrap();

        assert!(matches!(report, SettlementReport::StillPending { .. }));
    }

    #[tokio::test]
    async fn settled_payment_is_not_queried_again() {
        let h = Harness::new();
        let buyer = user(Role::User);
        let bought = purchase(&h, buyer.id, PaymentChannel::Ussd).await;

        let report = handler(&h)
            .handle(SyncPaymentStatusCommand {
                payment_id: bought.payment.id,
                actor: buyer,
            })
            .await
            .unwrap();

        assert_eq!(
            report,
            SettlementReport::AlreadySettled {
                payment_id: bought.payment.id,
                status: PaymentStatus::Success
            }
        );
    }

    #[tokio::test]
    async fn sync_finishes_ticket_left_pending_by_settlement() {
        let h = Harness::new();
        let buyer = user(Role::User);
        let bought = purchase(&h, buyer.id, PaymentChannel::Gateway).await;
        let reference = bought.payment.external_reference.clone().unwrap();

        h.tickets.fail_next_update();
        h.settler()
            .settle(bought.payment.clone(), GatewayOutcome::Succeeded, &reference)
            .await
            .unwrap_err();

        let report = handler(&h)
            .handle(SyncPaymentStatusCommand {
                payment_id: bought.payment.id,
                actor: buyer,
            })
            .await
            .unwrap();

        assert!(matches!(
            report,
            SettlementReport::AlreadySettled { status: PaymentStatus::Success, .. }
        ));
        let ticket = h.tickets.find_by_id(&bought.ticket.id).await.unwrap().unwrap();
        assert_eq!(ticket.status, TicketStatus::Paid);
    }

    #[tokio::test]
    async fn stranger_is_forbidden() {
        let h = Harness::new();
        let bought = purchase(&h, UserId::new(), PaymentChannel::Gateway).await;

        let err = handler(&h)
            .handle(SyncPaymentStatusCommand {
                payment_id: bought.payment.id,
                actor: user(Role::User),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, TicketingError::Forbidden(_)));
    }

    #[tokio::test]
    async fn unknown_payment_is_not_found() {
        let h = Harness::new();
        let err = handler(&h)
            .handle(SyncPaymentStatusCommand {
                payment_id: PaymentId::new(),
                actor: user(Role::Admin),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, TicketingError::PaymentNotFound(_)));
    }
}
