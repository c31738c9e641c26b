//! End-to-end purchase flows against the in-memory adapters.
//!
//! Drives the public handlers the way the binary wires them: purchase,
//! gateway webhook, cancellation, venue verification and USSD dialogs.

use std::sync::Arc;
use std::time::Duration;

use eventtix::adapters::memory::{
    InMemoryEventRepository, InMemoryPaymentRepository, InMemoryTicketRepository,
    InMemoryUserDirectory,
};
use eventtix::adapters::momo::MockPaymentGateway;
use eventtix::adapters::sms::RecordingDispatcher;
use eventtix::application::handlers::{
    CancelTicketCommand, CancelTicketHandler, HandleUssdRequestCommand, HandleUssdRequestHandler,
    PurchaseTicketsCommand, PurchaseTicketsHandler, PurchaseTicketsResult,
    ReconcilePaymentCommand, ReconcilePaymentHandler, UssdSettings, VerificationVerdict,
    VerifyTicketCommand, VerifyTicketHandler,
};
use eventtix::application::{InventoryLedger, Notifier, PaymentSettler, SettlementReport};
use eventtix::domain::errors::TicketingError;
use eventtix::domain::event::{Event, EventStatus};
use eventtix::domain::foundation::{
    AuthenticatedUser, EventId, Money, PhoneNumber, Role, Timestamp, UserId,
};
use eventtix::domain::payment::{PaymentChannel, PaymentStatus};
use eventtix::domain::ticket::TicketStatus;
use eventtix::ports::{EventRepository, PaymentRepository, TicketRepository, UserProfile};

const CALLER: &str = "+233241234567";

struct Engine {
    events: Arc<InMemoryEventRepository>,
    tickets: Arc<InMemoryTicketRepository>,
    payments: Arc<InMemoryPaymentRepository>,
    users: Arc<InMemoryUserDirectory>,
    sms: Arc<RecordingDispatcher>,
    purchase: Arc<PurchaseTicketsHandler>,
    reconcile: ReconcilePaymentHandler,
    cancel: CancelTicketHandler,
    verify: VerifyTicketHandler,
    ussd: HandleUssdRequestHandler,
}

impl Engine {
    fn new() -> Self {
        let events = Arc::new(InMemoryEventRepository::new());
        let tickets = Arc::new(InMemoryTicketRepository::new());
        let payments = Arc::new(InMemoryPaymentRepository::new());
        let users = Arc::new(InMemoryUserDirectory::new());
        let gateway = Arc::new(MockPaymentGateway::new());
        let sms = Arc::new(RecordingDispatcher::new());

        let notifier = Notifier::new(sms.clone(), "EventTix");
        let ledger = Arc::new(InventoryLedger::new(events.clone()));
        let settler = Arc::new(PaymentSettler::new(
            events.clone(),
            tickets.clone(),
            payments.clone(),
            notifier.clone(),
        ));
        let purchase = Arc::new(PurchaseTicketsHandler::new(
            events.clone(),
            tickets.clone(),
            payments.clone(),
            ledger.clone(),
            gateway,
            settler.clone(),
        ));

        Self {
            reconcile: ReconcilePaymentHandler::new(payments.clone(), settler),
            cancel: CancelTicketHandler::new(tickets.clone(), payments.clone(), ledger),
            verify: VerifyTicketHandler::new(
                events.clone(),
                tickets.clone(),
                payments.clone(),
                notifier,
            ),
            ussd: HandleUssdRequestHandler::new(
                events.clone(),
                tickets.clone(),
                users.clone(),
                purchase.clone(),
                UssdSettings::default(),
            ),
            purchase,
            events,
            tickets,
            payments,
            users,
            sms,
        }
    }

    async fn seed_event(&self, capacity: u32, sold: u32) -> Event {
        let mut event = Event::new(
            EventId::new(),
            "Highlife Festival",
            "Open air concert",
            Timestamp::from_unix_secs(1_760_884_200),
            "Independence Square",
            Money::from_units(15, 50).unwrap(),
            capacity,
            EventStatus::Active,
            UserId::new(),
        )
        .unwrap();
        event.sold = sold;
        self.events.insert(event.clone()).await;
        event
    }

    async fn register_caller(&self) -> UserProfile {
        let profile = UserProfile {
            id: UserId::new(),
            name: "Ama".to_string(),
            phone: PhoneNumber::parse(CALLER).unwrap(),
            role: Role::User,
        };
        self.users.insert(profile.clone()).await;
        profile
    }

    async fn buy(&self, event: &Event, quantity: u32) -> Result<PurchaseTicketsResult, TicketingError> {
        self.purchase
            .handle(PurchaseTicketsCommand {
                event_id: event.id,
                quantity,
                purchaser_id: UserId::new(),
                phone_number: PhoneNumber::parse(CALLER).unwrap(),
                channel: PaymentChannel::Gateway,
            })
            .await
    }

    async fn webhook(&self, status: &str, reference: &str) -> Result<SettlementReport, TicketingError> {
        let payload = serde_json::to_vec(&serde_json::json!({
            "status": status,
            "transactionId": "tx-42",
            "reference": reference,
        }))
        .unwrap();
        self.reconcile
            .handle(ReconcilePaymentCommand {
                payload,
                signature: None,
            })
            .await
    }

    async fn sold(&self, event: &Event) -> u32 {
        self.events.find_by_id(&event.id).await.unwrap().unwrap().sold
    }

    async fn wait_for_sms(&self, count: usize) -> usize {
        for _ in 0..100 {
            if self.sms.sent().await.len() >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.sms.sent().await.len()
    }
}

fn staff() -> AuthenticatedUser {
    AuthenticatedUser::new(UserId::new(), Role::Organizer)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_purchases_never_oversell() {
    let engine = Arc::new(Engine::new());
    let event = engine.seed_event(25, 0).await;

    let mut tasks = Vec::new();
    for i in 0..40 {
        let engine = engine.clone();
        let event = event.clone();
        tasks.push(tokio::spawn(async move {
            engine.buy(&event, 1 + i % 2).await.map(|r| r.ticket.quantity)
        }));
    }

    let mut reserved = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(quantity) => reserved += quantity,
            Err(TicketingError::NotEnoughTickets { .. }) => {}
            Err(other) => panic!("unexpected error: {}", other),
        }
    }

    let sold = engine.sold(&event).await;
    assert!(sold <= 25);
    assert_eq!(sold, reserved);

    let issued: u32 = engine.tickets.all().await.iter().map(|t| t.quantity).sum();
    assert_eq!(issued, sold);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn last_ticket_goes_to_exactly_one_buyer() {
    let engine = Arc::new(Engine::new());
    let event = engine.seed_event(1, 0).await;

    let (a, b) = tokio::join!(engine.buy(&event, 1), engine.buy(&event, 1));

    let outcomes = [a.is_ok(), b.is_ok()];
    assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 1);
    let failure = if a.is_err() { a.err() } else { b.err() };
    assert!(matches!(failure, Some(TicketingError::NotEnoughTickets { .. })));
    assert_eq!(engine.sold(&event).await, 1);
}

#[tokio::test]
async fn duplicate_webhook_settles_once() {
    let engine = Engine::new();
    let event = engine.seed_event(50, 0).await;
    let purchase = engine.buy(&event, 2).await.unwrap();
    let reference = purchase.payment.external_reference.clone().unwrap();

    let first = engine.webhook("SUCCESSFUL", &reference).await.unwrap();
    assert!(matches!(first, SettlementReport::Settled { status: PaymentStatus::Success, .. }));
    assert_eq!(engine.wait_for_sms(1).await, 1);

    let second = engine.webhook("SUCCESSFUL", &reference).await.unwrap();
    assert!(matches!(
        second,
        SettlementReport::AlreadySettled { status: PaymentStatus::Success, .. }
    ));

    let ticket = engine.tickets.find_by_id(&purchase.ticket.id).await.unwrap().unwrap();
    assert_eq!(ticket.status, TicketStatus::Paid);
    assert_eq!(engine.sold(&event).await, 2);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(engine.sms.sent().await.len(), 1);
}

#[tokio::test]
async fn redelivered_webhook_finishes_interrupted_settlement() {
    let engine = Engine::new();
    let event = engine.seed_event(50, 0).await;
    let purchase = engine.buy(&event, 1).await.unwrap();
    let reference = purchase.payment.external_reference.clone().unwrap();

    engine.tickets.fail_next_update();
    let first = engine.webhook("SUCCESSFUL", &reference).await;
    assert!(matches!(first, Err(TicketingError::Infrastructure(_))));
    let ticket = engine.tickets.find_by_id(&purchase.ticket.id).await.unwrap().unwrap();
    assert_eq!(ticket.status, TicketStatus::Pending);

    let retry = engine.webhook("SUCCESSFUL", &reference).await.unwrap();
    assert!(matches!(
        retry,
        SettlementReport::AlreadySettled { status: PaymentStatus::Success, .. }
    ));
    let ticket = engine.tickets.find_by_id(&purchase.ticket.id).await.unwrap().unwrap();
    assert_eq!(ticket.status, TicketStatus::Paid);
    assert_eq!(engine.wait_for_sms(1).await, 1);
    assert_eq!(engine.sold(&event).await, 1);
}

#[tokio::test]
async fn unknown_reference_changes_nothing() {
    let engine = Engine::new();
    let event = engine.seed_event(50, 0).await;
    let purchase = engine.buy(&event, 1).await.unwrap();

    let result = engine.webhook("SUCCESSFUL", "NO_SUCH_REFERENCE").await;

    assert!(matches!(result, Err(TicketingError::PaymentNotFound(_))));
    let payment = engine.payments.find_by_id(&purchase.payment.id).await.unwrap().unwrap();
    assert_eq!(payment.status, PaymentStatus::Pending);
    let ticket = engine.tickets.find_by_id(&purchase.ticket.id).await.unwrap().unwrap();
    assert_eq!(ticket.status, TicketStatus::Pending);
    assert_eq!(engine.sold(&event).await, 1);
}

#[tokio::test]
async fn refunding_a_paid_ticket_returns_its_seats() {
    let engine = Engine::new();
    let event = engine.seed_event(100, 7).await;
    let purchase = engine.buy(&event, 3).await.unwrap();
    let reference = purchase.payment.external_reference.clone().unwrap();
    engine.webhook("SUCCESSFUL", &reference).await.unwrap();
    assert_eq!(engine.sold(&event).await, 10);

    let result = engine
        .cancel
        .handle(CancelTicketCommand {
            ticket_id: purchase.ticket.id,
            actor: staff(),
        })
        .await
        .unwrap();

    assert_eq!(result.ticket.status, TicketStatus::Refunded);
    assert_eq!(result.released, 3);
    assert_eq!(engine.sold(&event).await, 7);
}

#[tokio::test]
async fn a_ticket_is_admitted_only_once() {
    let engine = Engine::new();
    let event = engine.seed_event(10, 0).await;
    let purchase = engine.buy(&event, 1).await.unwrap();
    let reference = purchase.payment.external_reference.clone().unwrap();
    engine.webhook("SUCCESSFUL", &reference).await.unwrap();

    let verify = || {
        engine.verify.handle(VerifyTicketCommand {
            code: purchase.ticket.code.to_string(),
            event_id: event.id,
            actor: staff(),
        })
    };

    let first = verify().await.unwrap();
    let used_at = match first {
        VerificationVerdict::Admitted { ticket } => ticket.used_at,
        other => panic!("expected admission, got {:?}", other),
    };
    assert!(used_at.is_some());

    let second = verify().await.unwrap();
    match second {
        VerificationVerdict::AlreadyUsed { used_at: again } => assert_eq!(again, used_at),
        other => panic!("expected already used, got {:?}", other),
    }
}

#[tokio::test]
async fn ussd_dialog_buys_a_ticket() {
    let engine = Engine::new();
    let caller = engine.register_caller().await;
    let event = engine.seed_event(10, 3).await;

    let result = engine
        .ussd
        .handle(HandleUssdRequestCommand {
            session_id: "session-1".to_string(),
            service_code: "*384*123#".to_string(),
            phone_number: CALLER.to_string(),
            text: "2*1*1*1".to_string(),
        })
        .await;

    assert!(result.reply.is_end());
    assert_eq!(engine.sold(&event).await, 4);

    let tickets = engine.tickets.all().await;
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0].owner_id, caller.id);
    assert_eq!(tickets[0].status, TicketStatus::Paid);
    assert!(result.reply.text.contains(tickets[0].code.as_str()));
}
