//! Axum router configuration for ticketing endpoints.

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;

use super::super::middleware::{auth_middleware, AuthState};
use super::handlers::{
    cancel_ticket, get_ticket_pass, health, momo_webhook, purchase_tickets, sync_payment_status,
    ussd_callback, verify_ticket, TicketingAppState,
};

/// Endpoints that require a bearer token.
///
/// - `POST /purchases` - Buy tickets through the payment gateway
/// - `POST /tickets/verify` - Admit a ticket at the venue (staff)
/// - `POST /tickets/:id/cancel` - Cancel or refund a ticket
/// - `GET /tickets/:id/pass` - QR pass for a paid ticket
/// - `POST /payments/:id/sync` - Poll the gateway for a pending payment
pub fn authenticated_routes(validator: AuthState) -> Router<TicketingAppState> {
    Router::new()
        .route("/purchases", post(purchase_tickets))
        .route("/tickets/verify", post(verify_ticket))
        .route("/tickets/:id/cancel", post(cancel_ticket))
        .route("/tickets/:id/pass", get(get_ticket_pass))
        .route("/payments/:id/sync", post(sync_payment_status))
        .route_layer(middleware::from_fn_with_state(validator, auth_middleware))
}

/// Callbacks from external systems. No bearer token; the webhook is
/// authenticated by signature.
///
/// - `POST /webhooks/momo` - Payment gateway notifications
/// - `POST /ussd` - USSD aggregator callbacks
pub fn callback_routes() -> Router<TicketingAppState> {
    Router::new()
        .route("/webhooks/momo", post(momo_webhook))
        .route("/ussd", post(ussd_callback))
}

/// Complete ticketing router, mounted at `/api`, plus `GET /health`.
pub fn ticketing_router(validator: AuthState) -> Router<TicketingAppState> {
    Router::new()
        .nest(
            "/api",
            authenticated_routes(validator).merge(callback_routes()),
        )
        .route("/health", get(health))
}
