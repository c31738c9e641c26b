//! Stateless USSD navigation.
//!
//! A dialog has no server-side session. Every request carries the full
//! `*`-separated history of selections, and the current screen is recomputed
//! from scratch by replaying that history through the menu grammar:
//!
//! ```text
//! main ─1─► events ─n─► event details (END)
//!      ─2─► buy ─1─► events ─n─► confirm ─1─► purchase (END)
//!                                        ─0─► cancelled (END)
//!      ─3─► my tickets ─n─► ticket details (END)
//!      ─4─► help
//! ```
//!
//! On every continuing screen except the confirmation, `0` means Back and
//! pops the previous selection. Numeric indices are 1-based positions in a
//! listing; whether an index exists is decided by the caller against live
//! data.

/// Which flow an event listing belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPurpose {
    Browse,
    Buy,
}

/// Why a dialog was terminated with an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidInput {
    /// Unknown menu option.
    Option,
    /// Event index is not a positive number.
    EventSelection,
    /// Ticket index is not a positive number.
    TicketSelection,
    /// Input continues past a terminal screen.
    TooDeep,
}

/// Where the caller is after replaying the dialed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    MainMenu,
    EventList(ListPurpose),
    EventDetails { index: usize },
    BuyMenu,
    ConfirmPurchase { index: usize },
    Purchase { index: usize },
    PurchaseCancelled,
    MyTickets,
    TicketDetails { index: usize },
    Help,
    Invalid(InvalidInput),
}

enum Step {
    Forward(Screen),
    Back,
}

impl Screen {
    /// Returns true if this screen ends the dialog.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Screen::EventDetails { .. }
                | Screen::Purchase { .. }
                | Screen::PurchaseCancelled
                | Screen::TicketDetails { .. }
                | Screen::Invalid(_)
        )
    }

    fn select(&self, token: &str) -> Step {
        use Screen::*;
        match self {
            MainMenu => Step::Forward(match token {
                "1" => EventList(ListPurpose::Browse),
                "2" => BuyMenu,
                "3" => MyTickets,
                "4" => Help,
                _ => Invalid(InvalidInput::Option),
            }),
            EventList(purpose) => match token {
                "0" => Step::Back,
                _ => Step::Forward(match (parse_index(token), purpose) {
                    (Some(index), ListPurpose::Browse) => EventDetails { index },
                    (Some(index), ListPurpose::Buy) => ConfirmPurchase { index },
                    (None, _) => Invalid(InvalidInput::EventSelection),
                }),
            },
            BuyMenu => match token {
                "0" => Step::Back,
                "1" => Step::Forward(EventList(ListPurpose::Buy)),
                _ => Step::Forward(Invalid(InvalidInput::Option)),
            },
            ConfirmPurchase { index } => Step::Forward(match token {
                "1" => Purchase { index: *index },
                "0" => PurchaseCancelled,
                _ => Invalid(InvalidInput::Option),
            }),
            MyTickets => match token {
                "0" => Step::Back,
                _ => Step::Forward(match parse_index(token) {
                    Some(index) => TicketDetails { index },
                    None => Invalid(InvalidInput::TicketSelection),
                }),
            },
            Help => match token {
                "0" => Step::Back,
                _ => Step::Forward(Invalid(InvalidInput::Option)),
            },
            EventDetails { .. }
            | Purchase { .. }
            | PurchaseCancelled
            | TicketDetails { .. }
            | Invalid(_) => Step::Forward(Invalid(InvalidInput::TooDeep)),
        }
    }
}

/// Replays the accumulated dialed text and returns the current screen.
///
/// Empty text is the main menu. Segments are trimmed before matching.
pub fn navigate(text: &str) -> Screen {
    let mut trail = vec![Screen::MainMenu];
    if text.trim().is_empty() {
        return Screen::MainMenu;
    }

    for token in text.split('*').map(str::trim) {
        let current = trail.last().copied().unwrap_or(Screen::MainMenu);
        if current.is_terminal() {
            return Screen::Invalid(InvalidInput::TooDeep);
        }
        match current.select(token) {
            Step::Forward(next) => trail.push(next),
            Step::Back => {
                trail.pop();
                if trail.is_empty() {
                    trail.push(Screen::MainMenu);
                }
            }
        }
    }

    trail.last().copied().unwrap_or(Screen::MainMenu)
}

fn parse_index(token: &str) -> Option<usize> {
    if token.is_empty() || !token.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    token.parse::<usize>().ok().filter(|i| *i >= 1)
}
