//! Mapping of `TicketingError` onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domain::errors::TicketingError;

/// JSON error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error_code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Unredacted message of a 5xx error, attached to the response so that
/// `reveal_internal_errors` can expose it when verbose errors are on.
#[derive(Debug, Clone)]
pub struct InternalDetail(pub String);

/// API error type that converts handler errors to HTTP responses.
#[derive(Debug)]
pub struct ApiError(pub TicketingError);

impl From<TicketingError> for ApiError {
    fn from(err: TicketingError) -> Self {
        Self(err)
    }
}

pub fn status_for(err: &TicketingError) -> StatusCode {
    match err {
        TicketingError::EventNotFound(_)
        | TicketingError::TicketNotFound(_)
        | TicketingError::PaymentNotFound(_)
        | TicketingError::UserNotFound(_) => StatusCode::NOT_FOUND,
        TicketingError::EventNotAvailable { .. }
        | TicketingError::NotEnoughTickets { .. }
        | TicketingError::InvalidTransition(_)
        | TicketingError::Conflict(_) => StatusCode::CONFLICT,
        TicketingError::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
        TicketingError::Unauthorized | TicketingError::InvalidWebhookSignature(_) => {
            StatusCode::UNAUTHORIZED
        }
        TicketingError::Forbidden(_) => StatusCode::FORBIDDEN,
        TicketingError::ChannelDisabled(_) => StatusCode::SERVICE_UNAVAILABLE,
        TicketingError::ExternalService { .. } => StatusCode::BAD_GATEWAY,
        TicketingError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        let code = self.0.code().to_string();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "Request failed");
            let mut response =
                (status, Json(ErrorResponse::new(code, "Internal server error"))).into_response();
            response
                .extensions_mut()
                .insert(InternalDetail(self.0.message()));
            return response;
        }

        let mut body = ErrorResponse::new(code, self.0.message());
        if let TicketingError::NotEnoughTickets {
            requested,
            available,
            ..
        } = &self.0
        {
            body = body.with_details(serde_json::json!({
                "requested": requested,
                "available": available,
            }));
        }
        if self.0.is_retryable() {
            body = body.with_details(serde_json::json!({ "retryable": true }));
        }

        (status, Json(body)).into_response()
    }
}

/// Replaces the redacted body of a 5xx response with its real message.
pub async fn reveal_internal_errors(response: Response) -> Response {
    match response.extensions().get::<InternalDetail>().cloned() {
        Some(InternalDetail(message)) => {
            let status = response.status();
            (
                status,
                Json(ErrorResponse::new("INTERNAL_ERROR", message)),
            )
                .into_response()
        }
        None => response,
    }
}
