//! Shared fixtures for handler tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::adapters::http::TicketingAppState;
use crate::adapters::memory::{
    InMemoryEventRepository, InMemoryPaymentRepository, InMemoryTicketRepository,
    InMemoryUserDirectory,
};
use crate::adapters::momo::MockPaymentGateway;
use crate::adapters::sms::RecordingDispatcher;
use crate::domain::event::{Event, EventStatus};
use crate::domain::foundation::{
    AuthenticatedUser, EventId, Money, PhoneNumber, Role, Timestamp, UserId,
};
use crate::domain::ticket::TicketCode;
use crate::ports::{
    EventRepository, RenderError, RenderedImage, TicketCodeRenderer, UserProfile,
};

use super::handlers::{
    CancelTicketHandler, GetTicketPassHandler, HandleUssdRequestHandler, PurchaseTicketsHandler,
    ReconcilePaymentHandler, SyncPaymentStatusHandler, UssdSettings, VerifyTicketHandler,
};
use super::{InventoryLedger, Notifier, PaymentSettler};

pub(crate) const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a];

/// Renderer that returns a fixed PNG.
pub(crate) struct StaticRenderer;

#[async_trait]
impl TicketCodeRenderer for StaticRenderer {
    async fn render(&self, _code: &TicketCode) -> Result<RenderedImage, RenderError> {
        Ok(RenderedImage::png(PNG_BYTES.to_vec()))
    }
}

/// In-memory adapters wired the way the binary wires real ones.
pub(crate) struct Harness {
    pub events: Arc<InMemoryEventRepository>,
    pub tickets: Arc<InMemoryTicketRepository>,
    pub payments: Arc<InMemoryPaymentRepository>,
    pub users: Arc<InMemoryUserDirectory>,
    pub gateway: Arc<MockPaymentGateway>,
    pub sms: Arc<RecordingDispatcher>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_gateway(MockPaymentGateway::new())
    }

    pub fn with_gateway(gateway: MockPaymentGateway) -> Self {
        Self {
            events: Arc::new(InMemoryEventRepository::new()),
            tickets: Arc::new(InMemoryTicketRepository::new()),
            payments: Arc::new(InMemoryPaymentRepository::new()),
            users: Arc::new(InMemoryUserDirectory::new()),
            gateway: Arc::new(gateway),
            sms: Arc::new(RecordingDispatcher::new()),
        }
    }

    pub fn ledger(&self) -> Arc<InventoryLedger> {
        Arc::new(InventoryLedger::new(self.events.clone()))
    }

    pub fn notifier(&self) -> Notifier {
        Notifier::new(self.sms.clone(), "EventTix")
    }

    pub fn settler(&self) -> Arc<PaymentSettler> {
        Arc::new(PaymentSettler::new(
            self.events.clone(),
            self.tickets.clone(),
            self.payments.clone(),
            self.notifier(),
        ))
    }

    pub fn purchase_handler(&self) -> Arc<PurchaseTicketsHandler> {
        Arc::new(PurchaseTicketsHandler::new(
            self.events.clone(),
            self.tickets.clone(),
            self.payments.clone(),
            self.ledger(),
            self.gateway.clone(),
            self.settler(),
        ))
    }

    /// Every handler the HTTP surface needs, sharing this harness's adapters.
    pub fn app_state(&self) -> TicketingAppState {
        let purchase = self.purchase_handler();
        TicketingAppState {
            purchase: purchase.clone(),
            cancel: Arc::new(CancelTicketHandler::new(
                self.tickets.clone(),
                self.payments.clone(),
                self.ledger(),
            )),
            verify: Arc::new(VerifyTicketHandler::new(
                self.events.clone(),
                self.tickets.clone(),
                self.payments.clone(),
                self.notifier(),
            )),
            pass: Arc::new(GetTicketPassHandler::new(
                self.tickets.clone(),
                Arc::new(StaticRenderer),
            )),
            reconcile: Arc::new(ReconcilePaymentHandler::new(
                self.payments.clone(),
                self.settler(),
            )),
            sync: Arc::new(SyncPaymentStatusHandler::new(
                self.payments.clone(),
                self.gateway.clone(),
                self.settler(),
            )),
            ussd: Arc::new(HandleUssdRequestHandler::new(
                self.events.clone(),
                self.tickets.clone(),
                self.users.clone(),
                purchase,
                UssdSettings::default(),
            )),
            users: self.users.clone(),
        }
    }

    /// Seeds an event `days` from a fixed date, priced at $20.00.
    pub async fn seed_event_on(
        &self,
        title: &str,
        days: i64,
        capacity: u32,
        sold: u32,
        status: EventStatus,
    ) -> Event {
        let mut event = Event::new(
            EventId::new(),
            title,
            "An evening of live music",
            Timestamp::from_unix_secs(1_760_884_200).add_days(days),
            "National Theatre",
            Money::from_units(20, 0).unwrap(),
            capacity,
            status,
            UserId::new(),
        )
        .unwrap();
        event.sold = sold;
        self.events.insert(event.clone()).await;
        event
    }

    pub async fn seed_event(&self, capacity: u32, sold: u32) -> Event {
        self.seed_event_on("Jazz Night", 0, capacity, sold, EventStatus::Active)
            .await
    }

    pub async fn seed_user(&self, phone: &str, role: Role) -> UserProfile {
        let profile = UserProfile {
            id: UserId::new(),
            name: "Kofi".to_string(),
            phone: PhoneNumber::parse(phone).unwrap(),
            role,
        };
        self.users.insert(profile.clone()).await;
        profile
    }

    pub async fn sold(&self, id: &EventId) -> u32 {
        self.events.find_by_id(id).await.unwrap().unwrap().sold
    }

    /// Polls until the recorder holds `count` messages or a second passes.
    pub async fn wait_for_sms(&self, count: usize) -> Vec<(PhoneNumber, String)> {
        for _ in 0..100 {
            let sent = self.sms.sent().await;
            if sent.len() >= count {
                return sent;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.sms.sent().await
    }
}

pub(crate) fn phone() -> PhoneNumber {
    PhoneNumber::parse("+233241234567").unwrap()
}

pub(crate) fn user(role: Role) -> AuthenticatedUser {
    AuthenticatedUser::new(UserId::new(), role)
}
