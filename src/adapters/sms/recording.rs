//! Recording dispatcher for tests.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::foundation::PhoneNumber;
use crate::ports::{NotificationDispatcher, NotificationError};

/// Captures every message it delivers.
///
/// A failing recorder captures nothing and reports a transport error.
#[derive(Debug, Default)]
pub struct RecordingDispatcher {
    sent: Mutex<Vec<(PhoneNumber, String)>>,
    fail: AtomicBool,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: AtomicBool::new(true),
        }
    }

    pub async fn sent(&self) -> Vec<(PhoneNumber, String)> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingDispatcher {
    async fn notify(&self, phone: &PhoneNumber, message: &str) -> Result<(), NotificationError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotificationError::Transport("recorder set to fail".to_string()));
        }
        self.sent
            .lock()
            .await
            .push((phone.clone(), message.to_string()));
        Ok(())
    }
}
