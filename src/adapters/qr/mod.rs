//! Ticket code renderers.

mod http;

pub use http::{HttpQrRenderer, QrConfig};
