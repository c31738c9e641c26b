//! Notification dispatcher adapters.
//!
//! - `http` - SMS provider REST API
//! - `log_only` - writes messages to the log; used when SMS is disabled
//! - `recording` - captures messages for assertions

mod http;
mod log_only;
mod recording;

pub use http::{SmsConfig, SmsDispatcher};
pub use log_only::LogNotificationDispatcher;
pub use recording::RecordingDispatcher;
