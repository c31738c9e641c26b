//! HandleUssdRequestHandler - Answers one USSD gateway callback.
//!
//! Nothing is stored between requests. The dialed text is replayed through
//! `navigate` and the resulting screen is rendered against live data. Event
//! listings are re-read on every request in `(date, id)` order, so an index
//! chosen on one screen resolves to the same event on the next unless the
//! on-sale set changed in between.
//!
//! Every outcome is a reply. Business failures end the dialog with a
//! message; infrastructure failures end it with a generic apology.

use std::sync::Arc;

use futures::future::try_join_all;

use crate::application::handlers::purchase::{PurchaseTicketsCommand, PurchaseTicketsHandler};
use crate::domain::errors::TicketingError;
use crate::domain::event::Event;
use crate::domain::foundation::PhoneNumber;
use crate::domain::payment::PaymentChannel;
use crate::domain::ticket::Ticket;
use crate::domain::ussd::{navigate, InvalidInput, MenuCopy, Screen, UssdReply};
use crate::ports::{EventRepository, TicketRepository, UserDirectory, UserProfile};

const RECENT_TICKETS: usize = 5;
const UNKNOWN_EVENT: &str = "Unknown event";

/// Channel switches and menu copy.
#[derive(Debug, Clone)]
pub struct UssdSettings {
    pub enabled: bool,
    /// Maximum events shown in a listing.
    pub page_size: usize,
    pub copy: MenuCopy,
}

impl Default for UssdSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            page_size: 5,
            copy: MenuCopy::default(),
        }
    }
}

/// One callback from the USSD gateway.
#[derive(Debug, Clone)]
pub struct HandleUssdRequestCommand {
    pub session_id: String,
    pub service_code: String,
    /// Caller number as sent by the gateway; parsed leniently.
    pub phone_number: String,
    /// Accumulated `*`-separated selections.
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct HandleUssdRequestResult {
    pub session_id: String,
    pub service_code: String,
    pub reply: UssdReply,
}

pub struct HandleUssdRequestHandler {
    events: Arc<dyn EventRepository>,
    tickets: Arc<dyn TicketRepository>,
    users: Arc<dyn UserDirectory>,
    purchases: Arc<PurchaseTicketsHandler>,
    settings: UssdSettings,
}

impl HandleUssdRequestHandler {
    pub fn new(
        events: Arc<dyn EventRepository>,
        tickets: Arc<dyn TicketRepository>,
        users: Arc<dyn UserDirectory>,
        purchases: Arc<PurchaseTicketsHandler>,
        settings: UssdSettings,
    ) -> Self {
        Self {
            events,
            tickets,
            users,
            purchases,
            settings,
        }
    }

    pub async fn handle(&self, cmd: HandleUssdRequestCommand) -> HandleUssdRequestResult {
        let reply = if self.settings.enabled {
            let screen = navigate(&cmd.text);
            tracing::debug!(session_id = %cmd.session_id, screen = ?screen, "USSD request");
            match self.render(screen, &cmd.phone_number).await {
                Ok(reply) => reply,
                Err(e) => self.failure_reply(&cmd, e),
            }
        } else {
            self.settings.copy.channel_disabled()
        };

        HandleUssdRequestResult {
            session_id: cmd.session_id,
            service_code: cmd.service_code,
            reply,
        }
    }

    async fn render(&self, screen: Screen, phone: &str) -> Result<UssdReply, TicketingError> {
        let copy = &self.settings.copy;
        let reply = match screen {
            Screen::MainMenu => copy.main_menu(),
            Screen::Help => copy.help(),
            Screen::BuyMenu => copy.buy_menu(),
            Screen::PurchaseCancelled => copy.purchase_cancelled(),
            Screen::Invalid(reason) => copy.invalid(reason),
            Screen::EventList(_) => copy.event_list(&self.listing().await?),
            Screen::EventDetails { index } => match self.event_at(index).await? {
                Some(event) => copy.event_details(&event),
                None => copy.invalid(InvalidInput::EventSelection),
            },
            Screen::ConfirmPurchase { index } => match self.event_at(index).await? {
                Some(event) => copy.confirm_purchase(&event),
                None => copy.invalid(InvalidInput::EventSelection),
            },
            Screen::Purchase { index } => {
                let caller = self.caller(phone).await?;
                match self.event_at(index).await? {
                    Some(event) => self.purchase(&caller, &event).await?,
                    None => copy.invalid(InvalidInput::EventSelection),
                }
            }
            Screen::MyTickets => {
                let caller = self.caller(phone).await?;
                let tickets = self.recent_tickets(&caller).await?;
                let events = try_join_all(
                    tickets
                        .iter()
                        .map(|ticket| self.events.find_by_id(&ticket.event_id)),
                )
                .await?;
                let titled: Vec<(Ticket, String)> = tickets
                    .into_iter()
                    .zip(events)
                    .map(|(ticket, event)| {
                        let title = event
                            .map(|event| event.title)
                            .unwrap_or_else(|| UNKNOWN_EVENT.to_string());
                        (ticket, title)
                    })
                    .collect();
                copy.my_tickets(&titled)
            }
            Screen::TicketDetails { index } => {
                let caller = self.caller(phone).await?;
                let ticket = self.recent_tickets(&caller).await?.into_iter().nth(index - 1);
                let Some(ticket) = ticket else {
                    return Ok(copy.invalid(InvalidInput::TicketSelection));
                };
                match self.events.find_by_id(&ticket.event_id).await? {
                    Some(event) => copy.ticket_details(&ticket, &event),
                    None => copy.invalid(InvalidInput::TicketSelection),
                }
            }
        };
        Ok(reply)
    }

    async fn purchase(&self, caller: &UserProfile, event: &Event) -> Result<UssdReply, TicketingError> {
        let result = self
            .purchases
            .handle(PurchaseTicketsCommand {
                event_id: event.id,
                quantity: 1,
                purchaser_id: caller.id,
                phone_number: caller.phone.clone(),
                channel: PaymentChannel::Ussd,
            })
            .await?;

        tracing::info!(
            ticket_id = %result.ticket.id,
            event_id = %event.id,
            user_id = %caller.id,
            "USSD purchase completed"
        );

        Ok(self.settings.copy.purchase_succeeded(
            event,
            result.ticket.code.as_str(),
            result.ticket.price,
        ))
    }

    async fn listing(&self) -> Result<Vec<Event>, TicketingError> {
        Ok(self.events.list_on_sale(self.settings.page_size).await?)
    }

    /// Resolves a 1-based listing index.
    async fn event_at(&self, index: usize) -> Result<Option<Event>, TicketingError> {
        Ok(self.listing().await?.into_iter().nth(index - 1))
    }

    async fn caller(&self, phone: &str) -> Result<UserProfile, TicketingError> {
        let phone =
            PhoneNumber::parse(phone).map_err(|_| TicketingError::user_not_found(phone))?;
        self.users
            .find_by_phone(&phone)
            .await?
            .ok_or_else(|| TicketingError::user_not_found(phone))
    }

    async fn recent_tickets(&self, caller: &UserProfile) -> Result<Vec<Ticket>, TicketingError> {
        Ok(self
            .tickets
            .list_recent_by_owner(&caller.id, RECENT_TICKETS)
            .await?)
    }

    fn failure_reply(&self, cmd: &HandleUssdRequestCommand, err: TicketingError) -> UssdReply {
        let copy = &self.settings.copy;
        match err {
            TicketingError::UserNotFound(_) => copy.unregistered(),
            TicketingError::NotEnoughTickets { .. } => copy.sold_out(),
            TicketingError::EventNotAvailable { .. } | TicketingError::EventNotFound(_) => {
                copy.event_unavailable()
            }
            TicketingError::ChannelDisabled(_) => copy.channel_disabled(),
            other => {
                tracing::error!(
                    session_id = %cmd.session_id,
                    text = %cmd.text,
                    error = %other,
                    "USSD request failed"
                );
                copy.service_unavailable()
            }
        }
    }
}
