//! Fire-and-forget notifications.
//!
//! Messages are dispatched on a spawned task after the state change they
//! describe has been committed. Failures are logged and otherwise ignored.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::domain::event::Event;
use crate::domain::foundation::PhoneNumber;
use crate::domain::ticket::Ticket;
use crate::ports::NotificationDispatcher;

const EVENT_DATE_FORMAT: &str = "%b %-d, %Y %H:%M";

#[derive(Clone)]
pub struct Notifier {
    dispatcher: Arc<dyn NotificationDispatcher>,
    brand: String,
}

impl Notifier {
    pub fn new(dispatcher: Arc<dyn NotificationDispatcher>, brand: impl Into<String>) -> Self {
        Self {
            dispatcher,
            brand: brand.into(),
        }
    }

    /// Sends `message` to `phone` on a background task.
    ///
    /// The returned handle may be dropped; the task runs to completion
    /// either way.
    pub fn dispatch(&self, phone: PhoneNumber, message: String) -> JoinHandle<()> {
        let dispatcher = self.dispatcher.clone();
        tokio::spawn(async move {
            match dispatcher.notify(&phone, &message).await {
                Ok(()) => tracing::debug!(phone = %phone, "Notification sent"),
                Err(e) => tracing::warn!(phone = %phone, error = %e, "Notification failed"),
            }
        })
    }

    /// Text sent when a ticket's payment is confirmed.
    pub fn ticket_confirmed(&self, event: &Event, ticket: &Ticket) -> String {
        format!(
            "Your ticket for {} has been confirmed. Ticket Code: {}. Event Date: {}. Thank you for using {}!",
            event.title,
            ticket.code,
            event.date.format(EVENT_DATE_FORMAT),
            self.brand
        )
    }

    /// Text sent when a ticket is admitted at the venue.
    pub fn ticket_admitted(&self, event: &Event, ticket: &Ticket) -> String {
        format!(
            "Ticket {} has been admitted to {}. Enjoy the event!",
            ticket.code, event.title
        )
    }
}
