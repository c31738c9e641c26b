//! GetTicketPassHandler - QR pass for a paid ticket.

use std::sync::Arc;

use crate::domain::errors::TicketingError;
use crate::domain::foundation::{AuthenticatedUser, Capability, OwnedByUser, TicketId};
use crate::domain::ticket::{TicketCode, TicketStatus};
use crate::ports::{RenderedImage, TicketCodeRenderer, TicketRepository};

#[derive(Debug, Clone)]
pub struct GetTicketPassQuery {
    pub ticket_id: TicketId,
    pub actor: AuthenticatedUser,
}

/// Scannable pass encoding the ticket code.
#[derive(Debug, Clone)]
pub struct TicketPass {
    pub ticket_id: TicketId,
    pub code: TicketCode,
    pub image: RenderedImage,
}

impl TicketPass {
    /// `data:image/png;base64,...` form for inline display.
    pub fn data_uri(&self) -> String {
        self.image.to_data_uri()
    }
}

pub struct GetTicketPassHandler {
    tickets: Arc<dyn TicketRepository>,
    renderer: Arc<dyn TicketCodeRenderer>,
    enabled: bool,
}

impl GetTicketPassHandler {
    pub fn new(tickets: Arc<dyn TicketRepository>, renderer: Arc<dyn TicketCodeRenderer>) -> Self {
        Self {
            tickets,
            renderer,
            enabled: true,
        }
    }

    /// Switches passes off; every request then fails with `ChannelDisabled`.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub async fn handle(&self, query: GetTicketPassQuery) -> Result<TicketPass, TicketingError> {
        if !self.enabled {
            return Err(TicketingError::ChannelDisabled("qr"));
        }

        let ticket = self
            .tickets
            .find_by_id(&query.ticket_id)
            .await?
            .ok_or_else(|| TicketingError::ticket_not_found(query.ticket_id))?;

        ticket.check_access(&query.actor, Capability::ViewAnyTicket)?;

        if ticket.status != TicketStatus::Paid {
            return Err(TicketingError::validation(
                "ticket_id",
                format!("No pass for a {} ticket", ticket.status),
            ));
        }

        let image = self.renderer.render(&ticket.code).await.map_err(|e| {
            tracing::warn!(ticket_id = %ticket.id, error = %e, "Pass rendering failed");
            TicketingError::external("qr renderer", e.to_string())
        })?;

        Ok(TicketPass {
            ticket_id: ticket.id,
            code: ticket.code,
            image,
        })
    }
}
