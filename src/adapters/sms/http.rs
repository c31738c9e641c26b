//! SMS provider client.
//!
//! Sends `POST {base_url}/messages` with `{to, from, message}`. The API key
//! goes in a bearer `Authorization` header and the secret in `X-API-Key`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::PhoneNumber;
use crate::ports::{NotificationDispatcher, NotificationError};

#[derive(Debug, Clone)]
pub struct SmsConfig {
    api_key: Secret<String>,
    api_secret: Secret<String>,
    pub sender_id: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl SmsConfig {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            api_secret: Secret::new(api_secret.into()),
            sender_id: "EventTix".to_string(),
            base_url: "https://api.mtn.com/sms/v1".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_sender_id(mut self, sender_id: impl Into<String>) -> Self {
        self.sender_id = sender_id.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Serialize)]
struct SmsRequest<'a> {
    to: &'a str,
    from: &'a str,
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct SmsResponse {
    status: String,
    #[serde(default)]
    message: String,
}

pub struct SmsDispatcher {
    config: SmsConfig,
    client: Client,
}

impl SmsDispatcher {
    pub fn new(config: SmsConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    fn messages_url(&self) -> String {
        format!("{}/messages", self.config.base_url)
    }
}

#[async_trait]
impl NotificationDispatcher for SmsDispatcher {
    async fn notify(&self, phone: &PhoneNumber, message: &str) -> Result<(), NotificationError> {
        let request = SmsRequest {
            to: phone.as_str(),
            from: &self.config.sender_id,
            message,
        };

        let response = self
            .client
            .post(self.messages_url())
            .bearer_auth(self.config.api_key.expose_secret())
            .header("X-API-Key", self.config.api_secret.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| NotificationError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotificationError::Rejected(format!(
                "SMS API returned status {}",
                status.as_u16()
            )));
        }

        let body: SmsResponse = response
            .json()
            .await
            .map_err(|e| NotificationError::Transport(format!("invalid SMS response: {}", e)))?;

        if body.status != "success" {
            return Err(NotificationError::Rejected(body.message));
        }
        Ok(())
    }
}
