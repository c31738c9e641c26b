//! Notification dispatcher port.
//!
//! Best effort: callers log failures and never roll back state because of
//! them.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::PhoneNumber;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotificationError {
    #[error("notification transport failed: {0}")]
    Transport(String),

    #[error("notification provider rejected message: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn notify(&self, phone: &PhoneNumber, message: &str) -> Result<(), NotificationError>;
}
