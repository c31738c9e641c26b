//! Log-only notification dispatcher.

use async_trait::async_trait;

use crate::domain::foundation::PhoneNumber;
use crate::ports::{NotificationDispatcher, NotificationError};

/// Writes each message to the log instead of sending it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotificationDispatcher;

#[async_trait]
impl NotificationDispatcher for LogNotificationDispatcher {
    async fn notify(&self, phone: &PhoneNumber, message: &str) -> Result<(), NotificationError> {
        tracing::info!(phone = %phone, message, "SMS disabled; notification logged");
        Ok(())
    }
}
