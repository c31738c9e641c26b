//! USSD domain module.
//!
//! # Module Structure
//!
//! - `navigation` - Pure replay of dialed text into a `Screen`
//! - `menu` - Screen text and the continue/end reply type

mod menu;
mod navigation;

pub use menu::{MenuCopy, ReplyKind, UssdReply};
pub use navigation::{navigate, InvalidInput, ListPurpose, Screen};
