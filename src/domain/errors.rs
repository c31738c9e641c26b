//! Ticketing error taxonomy.
//!
//! Every command handler returns `TicketingError`. Repository and aggregate
//! methods return `DomainError`, which converts in by error code.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | EventNotFound / TicketNotFound / PaymentNotFound / UserNotFound | 404 |
//! | EventNotAvailable / NotEnoughTickets / InvalidTransition | 409 |
//! | ValidationFailed | 400 |
//! | Unauthorized / InvalidWebhookSignature | 401 |
//! | Forbidden | 403 |
//! | ChannelDisabled | 503 |
//! | ExternalService | 502 |
//! | Conflict | 409 |
//! | Infrastructure | 500 |

use crate::domain::event::CapacityExceeded;
use crate::domain::foundation::{DomainError, ErrorCode, EventId};
use crate::domain::payment::WebhookError;

/// Errors surfaced by ticketing commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketingError {
    EventNotFound(String),

    /// The event exists but is not in a purchasable status.
    EventNotAvailable {
        event_id: EventId,
        status: String,
    },

    /// Capacity would be exceeded. Raised before any ticket or payment exists.
    NotEnoughTickets {
        event_id: EventId,
        requested: u32,
        available: u32,
    },

    TicketNotFound(String),

    /// No payment matches the id or external reference.
    PaymentNotFound(String),

    UserNotFound(String),

    /// The requested lifecycle transition is illegal from the current state.
    InvalidTransition(String),

    ValidationFailed {
        field: String,
        message: String,
    },

    Unauthorized,

    Forbidden(String),

    InvalidWebhookSignature(String),

    /// A purchase channel is switched off by configuration.
    ChannelDisabled(&'static str),

    /// A collaborator (gateway, renderer) failed. State is left consistent.
    ExternalService {
        service: &'static str,
        message: String,
    },

    /// Optimistic concurrency gave up; the caller may retry.
    Conflict(String),

    Infrastructure(String),
}

impl TicketingError {
    pub fn event_not_found(id: impl ToString) -> Self {
        TicketingError::EventNotFound(id.to_string())
    }

    pub fn ticket_not_found(id: impl ToString) -> Self {
        TicketingError::TicketNotFound(id.to_string())
    }

    pub fn payment_not_found(key: impl ToString) -> Self {
        TicketingError::PaymentNotFound(key.to_string())
    }

    pub fn user_not_found(key: impl ToString) -> Self {
        TicketingError::UserNotFound(key.to_string())
    }

    pub fn invalid_transition(message: impl Into<String>) -> Self {
        TicketingError::InvalidTransition(message.into())
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        TicketingError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        TicketingError::Forbidden(message.into())
    }

    pub fn external(service: &'static str, message: impl Into<String>) -> Self {
        TicketingError::ExternalService {
            service,
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        TicketingError::Conflict(message.into())
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        TicketingError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            TicketingError::EventNotFound(_) => ErrorCode::EventNotFound,
            TicketingError::EventNotAvailable { .. } => ErrorCode::EventNotAvailable,
            TicketingError::NotEnoughTickets { .. } => ErrorCode::NotEnoughTickets,
            TicketingError::TicketNotFound(_) => ErrorCode::TicketNotFound,
            TicketingError::PaymentNotFound(_) => ErrorCode::PaymentNotFound,
            TicketingError::UserNotFound(_) => ErrorCode::UserNotFound,
            TicketingError::InvalidTransition(_) => ErrorCode::InvalidStateTransition,
            TicketingError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            TicketingError::Unauthorized => ErrorCode::Unauthorized,
            TicketingError::Forbidden(_) => ErrorCode::Forbidden,
            TicketingError::InvalidWebhookSignature(_) => ErrorCode::InvalidWebhookSignature,
            TicketingError::ChannelDisabled(_) => ErrorCode::ChannelDisabled,
            TicketingError::ExternalService { .. } => ErrorCode::ExternalServiceError,
            TicketingError::Conflict(_) => ErrorCode::Conflict,
            TicketingError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a user-facing error message.
    pub fn message(&self) -> String {
        match self {
            TicketingError::EventNotFound(id) => format!("Event not found: {}", id),
            TicketingError::EventNotAvailable { event_id, status } => {
                format!("Event {} is not on sale (status: {})", event_id, status)
            }
            TicketingError::NotEnoughTickets {
                requested,
                available,
                ..
            } => format!(
                "Not enough tickets available: requested {}, {} left",
                requested, available
            ),
            TicketingError::TicketNotFound(id) => format!("Ticket not found: {}", id),
            TicketingError::PaymentNotFound(key) => format!("Payment not found: {}", key),
            TicketingError::UserNotFound(key) => format!("User not found: {}", key),
            TicketingError::InvalidTransition(msg) => msg.clone(),
            TicketingError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            TicketingError::Unauthorized => "Authentication required".to_string(),
            TicketingError::Forbidden(msg) => msg.clone(),
            TicketingError::InvalidWebhookSignature(msg) => {
                format!("Invalid webhook signature: {}", msg)
            }
            TicketingError::ChannelDisabled(channel) => {
                format!("The {} channel is disabled", channel)
            }
            TicketingError::ExternalService { service, message } => {
                format!("{} error: {}", service, message)
            }
            TicketingError::Conflict(msg) => format!("Concurrent update: {}", msg),
            TicketingError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }

    /// Returns true if the same request may succeed when retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TicketingError::Infrastructure(_)
                | TicketingError::Conflict(_)
                | TicketingError::ExternalService { .. }
        )
    }
}

impl std::fmt::Display for TicketingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for TicketingError {}

impl From<DomainError> for TicketingError {
    fn from(err: DomainError) -> Self {
        let detail = |key: &str| err.details.get(key).cloned().unwrap_or_default();
        match err.code {
            ErrorCode::EventNotFound => TicketingError::EventNotFound(detail("event_id")),
            ErrorCode::TicketNotFound => TicketingError::TicketNotFound(detail("ticket_id")),
            ErrorCode::PaymentNotFound => TicketingError::PaymentNotFound(detail("payment_id")),
            ErrorCode::UserNotFound => TicketingError::UserNotFound(detail("user_id")),
            ErrorCode::InvalidStateTransition => TicketingError::InvalidTransition(err.message),
            ErrorCode::ValidationFailed => TicketingError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            ErrorCode::Unauthorized => TicketingError::Unauthorized,
            ErrorCode::Forbidden => TicketingError::Forbidden(err.message),
            ErrorCode::Conflict => TicketingError::Conflict(err.message),
            ErrorCode::ExternalServiceError => TicketingError::ExternalService {
                service: "external",
                message: err.message,
            },
            _ => TicketingError::Infrastructure(err.to_string()),
        }
    }
}

impl From<CapacityExceeded> for TicketingError {
    fn from(err: CapacityExceeded) -> Self {
        TicketingError::NotEnoughTickets {
            event_id: err.event_id,
            requested: err.requested,
            available: err.available,
        }
    }
}

impl From<WebhookError> for TicketingError {
    fn from(err: WebhookError) -> Self {
        TicketingError::InvalidWebhookSignature(err.to_string())
    }
}

impl From<TicketingError> for DomainError {
    fn from(err: TicketingError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}
