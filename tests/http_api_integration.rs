//! HTTP surface tests through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use eventtix::adapters::auth::MockSessionValidator;
use eventtix::adapters::http::{app, AuthState, HttpSettings, TicketingAppState};
use eventtix::adapters::memory::{
    InMemoryEventRepository, InMemoryPaymentRepository, InMemoryTicketRepository,
    InMemoryUserDirectory,
};
use eventtix::adapters::momo::MockPaymentGateway;
use eventtix::adapters::sms::RecordingDispatcher;
use eventtix::application::handlers::{
    CancelTicketHandler, GetTicketPassHandler, HandleUssdRequestHandler, PurchaseTicketsHandler,
    ReconcilePaymentHandler, SyncPaymentStatusHandler, UssdSettings, VerifyTicketHandler,
};
use eventtix::application::{InventoryLedger, Notifier, PaymentSettler};
use eventtix::domain::event::{Event, EventStatus};
use eventtix::domain::foundation::{AuthenticatedUser, EventId, Money, Role, Timestamp, UserId};
use eventtix::domain::payment::{sign_body, WebhookSignatureVerifier, SIGNATURE_HEADER};
use eventtix::domain::ticket::TicketCode;
use eventtix::ports::{RenderError, RenderedImage, TicketCodeRenderer};

const WEBHOOK_SECRET: &str = "whsec-test";
const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

struct FixedRenderer;

#[async_trait]
impl TicketCodeRenderer for FixedRenderer {
    async fn render(&self, _code: &TicketCode) -> Result<RenderedImage, RenderError> {
        Ok(RenderedImage::png(PNG.to_vec()))
    }
}

struct TestApp {
    router: Router,
    events: Arc<InMemoryEventRepository>,
}

fn test_app() -> TestApp {
    let events = Arc::new(InMemoryEventRepository::new());
    let tickets = Arc::new(InMemoryTicketRepository::new());
    let payments = Arc::new(InMemoryPaymentRepository::new());
    let users = Arc::new(InMemoryUserDirectory::new());
    let gateway = Arc::new(MockPaymentGateway::new());

    let notifier = Notifier::new(Arc::new(RecordingDispatcher::new()), "EventTix");
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
        gateway.clone(),
        settler.clone(),
    ));

    let state = TicketingAppState {
        purchase: purchase.clone(),
        cancel: Arc::new(CancelTicketHandler::new(
            tickets.clone(),
            payments.clone(),
            ledger,
        )),
        verify: Arc::new(VerifyTicketHandler::new(
            events.clone(),
            tickets.clone(),
            payments.clone(),
            notifier,
        )),
        pass: Arc::new(GetTicketPassHandler::new(tickets.clone(), Arc::new(FixedRenderer))),
        reconcile: Arc::new(
            ReconcilePaymentHandler::new(payments.clone(), settler.clone())
                .with_verifier(WebhookSignatureVerifier::new(WEBHOOK_SECRET)),
        ),
        sync: Arc::new(SyncPaymentStatusHandler::new(payments, gateway, settler)),
        ussd: Arc::new(HandleUssdRequestHandler::new(
            events.clone(),
            tickets,
            users.clone(),
            purchase,
            UssdSettings::default(),
        )),
        users,
    };

    let validator: AuthState = Arc::new(
        MockSessionValidator::new()
            .with_user("buyer", AuthenticatedUser::new(UserId::new(), Role::User))
            .with_user("door", AuthenticatedUser::new(UserId::new(), Role::Organizer)),
    );

    TestApp {
        router: app(state, validator, &HttpSettings::default()),
        events,
    }
}

async fn seed_event(events: &InMemoryEventRepository) -> Event {
    let event = Event::new(
        EventId::new(),
        "Afrobeats Live",
        "",
        Timestamp::from_unix_secs(1_760_884_200),
        "Accra Sports Stadium",
        Money::from_units(25, 0).unwrap(),
        100,
        EventStatus::Active,
        UserId::new(),
    )
    .unwrap();
    events.insert(event.clone()).await;
    event
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn call(router: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn call_json(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, bytes) = call(router, request).await;
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn signed_webhook(reference: &str, secret: &str) -> Request<Body> {
    let body = json!({
        "status": "SUCCESSFUL",
        "transactionId": "tx-9",
        "reference": reference,
    })
    .to_string();
    let signature = sign_body(secret.as_bytes(), body.as_bytes()).unwrap();
    Request::builder()
        .method("POST")
        .uri("/api/webhooks/momo")
        .header("Content-Type", "application/json")
        .header(SIGNATURE_HEADER, signature)
        .body(Body::from(body))
        .unwrap()
}

async fn purchase(app: &TestApp, event: &Event) -> Value {
    let (status, body) = call_json(
        &app.router,
        json_request(
            "POST",
            "/api/purchases",
            Some("buyer"),
            json!({ "event_id": event.id, "quantity": 1, "phone_number": "+233241234567" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

#[tokio::test]
async fn signed_webhook_settles_and_replay_is_acknowledged() {
    let app = test_app();
    let event = seed_event(&app.events).await;
    let bought = purchase(&app, &event).await;
    let reference = bought["payment"]["external_reference"].as_str().unwrap().to_string();

    let (status, body) = call_json(&app.router, signed_webhook(&reference, WEBHOOK_SECRET)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "settled");
    assert_eq!(body["status"], "success");

    let (status, body) = call_json(&app.router, signed_webhook(&reference, WEBHOOK_SECRET)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "already_settled");
}

#[tokio::test]
async fn forged_webhook_is_rejected() {
    let app = test_app();
    let event = seed_event(&app.events).await;
    let bought = purchase(&app, &event).await;
    let reference = bought["payment"]["external_reference"].as_str().unwrap().to_string();

    let (status, _) = call_json(&app.router, signed_webhook(&reference, "wrong-secret")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn only_staff_may_verify_tickets() {
    let app = test_app();
    let event = seed_event(&app.events).await;
    let bought = purchase(&app, &event).await;
    let reference = bought["payment"]["external_reference"].as_str().unwrap().to_string();
    call_json(&app.router, signed_webhook(&reference, WEBHOOK_SECRET)).await;
    let code = bought["ticket"]["code"].as_str().unwrap();
    let verify = |token: &str| {
        json_request(
            "POST",
            "/api/tickets/verify",
            Some(token),
            json!({ "code": code, "event_id": event.id }),
        )
    };

    let (status, _) = call_json(&app.router, verify("buyer")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call_json(&app.router, verify("door")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);

    let (status, body) = call_json(&app.router, verify("door")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], false);
    assert_eq!(body["message"], "Ticket has already been used");
}

#[tokio::test]
async fn pass_is_served_as_png_for_paid_tickets() {
    let app = test_app();
    let event = seed_event(&app.events).await;
    let bought = purchase(&app, &event).await;
    let ticket_id = bought["ticket"]["id"].as_str().unwrap().to_string();
    let pass_request = |query: &str| {
        Request::builder()
            .uri(format!("/api/tickets/{}/pass{}", ticket_id, query))
            .header("Authorization", "Bearer door")
            .body(Body::empty())
            .unwrap()
    };

    let (status, _) = call(&app.router, pass_request("")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let reference = bought["payment"]["external_reference"].as_str().unwrap().to_string();
    call_json(&app.router, signed_webhook(&reference, WEBHOOK_SECRET)).await;

    let (status, bytes) = call(&app.router, pass_request("?format=png")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, PNG.to_vec());

    let (status, body) = call_json(&app.router, pass_request("")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data_uri"]
        .as_str()
        .unwrap()
        .starts_with("data:image/png;base64,"));
}
