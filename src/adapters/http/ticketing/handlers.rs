//! HTTP handlers for the ticketing endpoints.
//!
//! These handlers translate requests into application commands and
//! command results into JSON. All business decisions live in the
//! application layer.

use std::sync::Arc;

use axum::extract::{FromRequest, Json, Path, Query, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Form;

use crate::application::handlers::{
    CancelTicketCommand, CancelTicketHandler, GetTicketPassHandler, GetTicketPassQuery,
    HandleUssdRequestCommand, HandleUssdRequestHandler, PurchaseTicketsCommand,
    PurchaseTicketsHandler, ReconcilePaymentCommand, ReconcilePaymentHandler,
    SyncPaymentStatusCommand, SyncPaymentStatusHandler, VerifyTicketCommand, VerifyTicketHandler,
};
use crate::domain::errors::TicketingError;
use crate::domain::foundation::{AuthenticatedUser, PaymentId, PhoneNumber, TicketId};
use crate::domain::payment::{PaymentChannel, SIGNATURE_HEADER};
use crate::ports::UserDirectory;

use super::super::error::ApiError;
use super::super::middleware::RequireAuth;
use super::dto::{
    CancelTicketResponse, PassParams, PaymentView, PurchaseRequest, PurchaseResponse,
    SettlementResponse, TicketPassResponse, TicketView, UssdRequest, VerifyTicketRequest,
    VerifyTicketResponse,
};

/// Shared state: one long-lived instance of each application handler.
#[derive(Clone)]
pub struct TicketingAppState {
    pub purchase: Arc<PurchaseTicketsHandler>,
    pub cancel: Arc<CancelTicketHandler>,
    pub verify: Arc<VerifyTicketHandler>,
    pub pass: Arc<GetTicketPassHandler>,
    pub reconcile: Arc<ReconcilePaymentHandler>,
    pub sync: Arc<SyncPaymentStatusHandler>,
    pub ussd: Arc<HandleUssdRequestHandler>,
    pub users: Arc<dyn UserDirectory>,
}

/// POST /api/purchases
pub async fn purchase_tickets(
    State(state): State<TicketingAppState>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<PurchaseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let phone_number = purchase_phone(&state, &user, request.phone_number.as_deref()).await?;

    let result = state
        .purchase
        .handle(PurchaseTicketsCommand {
            event_id: request.event_id,
            quantity: request.quantity,
            purchaser_id: user.id,
            phone_number,
            channel: PaymentChannel::Gateway,
        })
        .await?;

    let response = PurchaseResponse {
        ticket: TicketView::from(&result.ticket),
        payment: PaymentView::from(&result.payment),
        gateway_status: result.gateway_status,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

async fn purchase_phone(
    state: &TicketingAppState,
    user: &AuthenticatedUser,
    requested: Option<&str>,
) -> Result<PhoneNumber, TicketingError> {
    if let Some(raw) = requested {
        return PhoneNumber::parse(raw)
            .map_err(|e| TicketingError::validation("phone_number", e.to_string()));
    }
    state
        .users
        .find_by_id(&user.id)
        .await?
        .map(|profile| profile.phone)
        .ok_or_else(|| {
            TicketingError::validation("phone_number", "No phone number on file; provide one")
        })
}

/// POST /api/tickets/:id/cancel
pub async fn cancel_ticket(
    State(state): State<TicketingAppState>,
    RequireAuth(user): RequireAuth,
    Path(ticket_id): Path<TicketId>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .cancel
        .handle(CancelTicketCommand {
            ticket_id,
            actor: user,
        })
        .await?;

    Ok(Json(CancelTicketResponse {
        ticket: TicketView::from(&result.ticket),
        released: result.released,
    }))
}

/// POST /api/tickets/verify
///
/// Every verdict is a 200; `valid` says whether to let the holder in.
pub async fn verify_ticket(
    State(state): State<TicketingAppState>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<VerifyTicketRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let verdict = state
        .verify
        .handle(VerifyTicketCommand {
            code: request.code,
            event_id: request.event_id,
            actor: user,
        })
        .await?;

    Ok(Json(VerifyTicketResponse::from(&verdict)))
}

/// GET /api/tickets/:id/pass
pub async fn get_ticket_pass(
    State(state): State<TicketingAppState>,
    RequireAuth(user): RequireAuth,
    Path(ticket_id): Path<TicketId>,
    Query(params): Query<PassParams>,
) -> Result<Response, ApiError> {
    let pass = state
        .pass
        .handle(GetTicketPassQuery {
            ticket_id,
            actor: user,
        })
        .await?;

    if params.format.as_deref() == Some("png") {
        let content_type = pass.image.content_type.clone();
        return Ok(([(CONTENT_TYPE, content_type)], pass.image.bytes).into_response());
    }
    Ok(Json(TicketPassResponse::from(&pass)).into_response())
}

/// POST /api/payments/:id/sync
pub async fn sync_payment_status(
    State(state): State<TicketingAppState>,
    RequireAuth(user): RequireAuth,
    Path(payment_id): Path<PaymentId>,
) -> Result<impl IntoResponse, ApiError> {
    let report = state
        .sync
        .handle(SyncPaymentStatusCommand {
            payment_id,
            actor: user,
        })
        .await?;

    Ok(Json(SettlementResponse::from(&report)))
}

/// POST /api/webhooks/momo
///
/// The raw body is kept for signature verification. Replays answer 200.
pub async fn momo_webhook(
    State(state): State<TicketingAppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let report = state
        .reconcile
        .handle(ReconcilePaymentCommand {
            payload: body.to_vec(),
            signature,
        })
        .await?;

    Ok(Json(SettlementResponse::from(&report)))
}

/// POST /api/ussd
///
/// Accepts the aggregator's form encoding or JSON and answers in the
/// `CON`/`END` plain-text wire form.
pub async fn ussd_callback(State(state): State<TicketingAppState>, request: Request) -> Response {
    let is_json = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map_or(false, |ct| ct.starts_with("application/json"));

    let parsed = if is_json {
        Json::<UssdRequest>::from_request(request, &())
            .await
            .map(|Json(body)| body)
            .map_err(IntoResponse::into_response)
    } else {
        Form::<UssdRequest>::from_request(request, &())
            .await
            .map(|Form(body)| body)
            .map_err(IntoResponse::into_response)
    };
    let body = match parsed {
        Ok(body) => body,
        Err(rejection) => return rejection,
    };

    let result = state
        .ussd
        .handle(HandleUssdRequestCommand {
            session_id: body.session_id,
            service_code: body.service_code,
            phone_number: body.phone_number,
            text: body.text,
        })
        .await;

    result.reply.to_wire().into_response()
}

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
