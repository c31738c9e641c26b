//! USSD screen text.
//!
//! Replies are rendered as plain text and carry a continue/end flag; the
//! wire form prefixes the text with `CON ` or `END `.

use crate::domain::event::Event;
use crate::domain::foundation::Money;
use crate::domain::ticket::Ticket;

use super::InvalidInput;

const EVENT_DATE_SHORT: &str = "%b %-d";
const EVENT_DATE_LONG: &str = "%b %-d, %Y %H:%M";

/// Whether the dialog continues after this reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Continue,
    End,
}

/// One USSD response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UssdReply {
    pub kind: ReplyKind,
    pub text: String,
}

impl UssdReply {
    pub fn continues(text: impl Into<String>) -> Self {
        Self {
            kind: ReplyKind::Continue,
            text: text.into(),
        }
    }

    pub fn ends(text: impl Into<String>) -> Self {
        Self {
            kind: ReplyKind::End,
            text: text.into(),
        }
    }

    pub fn is_end(&self) -> bool {
        self.kind == ReplyKind::End
    }

    /// Gateway wire form: `CON <text>` or `END <text>`.
    pub fn to_wire(&self) -> String {
        match self.kind {
            ReplyKind::Continue => format!("CON {}", self.text),
            ReplyKind::End => format!("END {}", self.text),
        }
    }
}

/// Branding and support contacts shown in menus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuCopy {
    pub brand: String,
    pub support_phone: String,
    pub support_email: String,
}

impl Default for MenuCopy {
    fn default() -> Self {
        Self {
            brand: "EventTix".to_string(),
            support_phone: "+1234567890".to_string(),
            support_email: "support@eventtix.com".to_string(),
        }
    }
}

impl MenuCopy {
    pub fn main_menu(&self) -> UssdReply {
        UssdReply::continues(format!(
            "Welcome to {}\n1. View Events\n2. Buy Ticket\n3. My Tickets\n4. Help",
            self.brand
        ))
    }

    pub fn help(&self) -> UssdReply {
        UssdReply::continues(format!(
            "Help\nCall: {}\nEmail: {}\n\n0. Back",
            self.support_phone, self.support_email
        ))
    }

    pub fn buy_menu(&self) -> UssdReply {
        UssdReply::continues("Buy Ticket\n1. Select Event\n\n0. Back")
    }

    /// Numbered listing of events, or an END reply if there are none.
    pub fn event_list(&self, events: &[Event]) -> UssdReply {
        if events.is_empty() {
            return UssdReply::ends("No events available at the moment.");
        }
        let mut text = String::from("Available Events:\n");
        for (i, event) in events.iter().enumerate() {
            text.push_str(&format!(
                "{}. {} - {}\n",
                i + 1,
                event.title,
                event.date.format(EVENT_DATE_SHORT)
            ));
        }
        text.push_str("0. Back");
        UssdReply::continues(text)
    }

    pub fn event_details(&self, event: &Event) -> UssdReply {
        UssdReply::ends(format!(
            "Event: {}\nDate: {}\nLocation: {}\nPrice: {}\nAvailable: {} tickets",
            event.title,
            event.date.format(EVENT_DATE_LONG),
            event.location,
            event.unit_price,
            event.available()
        ))
    }

    pub fn confirm_purchase(&self, event: &Event) -> UssdReply {
        UssdReply::continues(format!(
            "Event: {}\nPrice: {}\nQuantity: 1\nTotal: {}\n\n1. Confirm Purchase\n0. Cancel",
            event.title, event.unit_price, event.unit_price
        ))
    }

    pub fn purchase_succeeded(&self, event: &Event, ticket_code: &str, amount: Money) -> UssdReply {
        UssdReply::ends(format!(
            "Ticket purchased successfully!\nEvent: {}\nTicket Code: {}\nAmount: {}\n\nYou will receive an SMS with your ticket details.",
            event.title, ticket_code, amount
        ))
    }

    pub fn purchase_cancelled(&self) -> UssdReply {
        UssdReply::ends("Purchase cancelled.")
    }

    pub fn sold_out(&self) -> UssdReply {
        UssdReply::ends("Sorry, no tickets available for this event.")
    }

    pub fn event_unavailable(&self) -> UssdReply {
        UssdReply::ends("Sorry, this event is no longer on sale.")
    }

    /// Caller's recent tickets, each paired with its event title.
    pub fn my_tickets(&self, tickets: &[(Ticket, String)]) -> UssdReply {
        if tickets.is_empty() {
            return UssdReply::ends("You have no tickets.");
        }
        let mut text = String::from("Your Tickets:\n");
        for (i, (ticket, title)) in tickets.iter().enumerate() {
            text.push_str(&format!("{}. {} - {}\n", i + 1, title, ticket.status));
        }
        text.push_str("0. Back");
        UssdReply::continues(text)
    }

    pub fn ticket_details(&self, ticket: &Ticket, event: &Event) -> UssdReply {
        UssdReply::ends(format!(
            "Ticket: {}\nEvent: {}\nCode: {}\nStatus: {}\nDate: {}",
            ticket.code,
            event.title,
            ticket.code,
            ticket.status,
            event.date.format(EVENT_DATE_LONG)
        ))
    }

    pub fn unregistered(&self) -> UssdReply {
        UssdReply::ends("User not found. Please register first.")
    }

    pub fn service_unavailable(&self) -> UssdReply {
        UssdReply::ends("Service temporarily unavailable. Please try again later.")
    }

    pub fn channel_disabled(&self) -> UssdReply {
        UssdReply::ends("USSD service is currently disabled.")
    }

    pub fn invalid(&self, reason: InvalidInput) -> UssdReply {
        UssdReply::ends(match reason {
            InvalidInput::Option => "Invalid option. Please try again.",
            InvalidInput::EventSelection => "Invalid event selection.",
            InvalidInput::TicketSelection => "Invalid ticket selection.",
            InvalidInput::TooDeep => "Invalid menu level. Please try again.",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::EventStatus;
    use crate::domain::foundation::{EventId, Timestamp, UserId};

    fn event(title: &str, unix: i64) -> Event {
        Event::new(
            EventId::new(),
            title,
            "",
            Timestamp::from_unix_secs(unix),
            "City Hall",
            Money::from_units(12, 50).unwrap(),
            50,
            EventStatus::Active,
            UserId::new(),
        )
        .unwrap()
    }

    #[test]
    fn wire_form_prefixes() {
        assert_eq!(UssdReply::continues("x").to_wire(), "CON x");
        assert_eq!(UssdReply::ends("y").to_wire(), "END y");
    }

    #[test]
    fn main_menu_text() {
        assert_eq!(
            MenuCopy::default().main_menu().to_wire(),
            "CON Welcome to EventTix\n1. View Events\n2. Buy Ticket\n3. My Tickets\n4. Help"
        );
    }

    #[test]
    fn event_list_numbers_events_and_offers_back() {
        // 2025-01-02 and 2025-03-15, both UTC noon
        let events = vec![event("Jazz Night", 1_735_819_200), event("Expo", 1_742_040_000)];
        let reply = MenuCopy::default().event_list(&events);
        assert!(!reply.is_end());
        assert_eq!(
            reply.text,
            "Available Events:\n1. Jazz Night - Jan 2\n2. Expo - Mar 15\n0. Back"
        );
    }

    #[test]
    fn empty_event_list_ends() {
        let reply = MenuCopy::default().event_list(&[]);
        assert!(reply.is_end());
    }

    #[test]
    fn confirm_shows_price_twice() {
        let reply = MenuCopy::default().confirm_purchase(&event("Jazz Night", 0));
        assert_eq!(
            reply.text,
            "Event: Jazz Night\nPrice: $12.50\nQuantity: 1\nTotal: $12.50\n\n1. Confirm Purchase\n0. Cancel"
        );
    }

    #[test]
    fn invalid_replies_end_the_dialog() {
        let copy = MenuCopy::default();
        for reason in [
            InvalidInput::Option,
            InvalidInput::EventSelection,
            InvalidInput::TicketSelection,
            InvalidInput::TooDeep,
        ] {
            assert!(copy.invalid(reason).is_end());
        }
    }
}
