//! SMS provider configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use super::gateway::check_http_url;

/// SMS provider credentials. Only required when SMS is enabled.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SmsSettings {
    pub api_key: Option<SecretString>,
    pub api_secret: Option<SecretString>,
    pub sender_id: Option<String>,
    pub base_url: Option<String>,
}

impl SmsSettings {
    /// Returns `(api_key, api_secret)` when both are set.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let key = self.api_key.as_ref()?.expose_secret();
        let secret = self.api_secret.as_ref()?.expose_secret();
        if key.is_empty() || secret.is_empty() {
            None
        } else {
            Some((key.as_str(), secret.as_str()))
        }
    }

    pub fn validate(&self, enabled: bool) -> Result<(), ValidationError> {
        if !enabled {
            return Ok(());
        }
        if self.credentials().is_none() {
            return Err(ValidationError::MissingRequired("SMS__API_KEY / SMS__API_SECRET"));
        }
        if let Some(url) = &self.base_url {
            check_http_url(url, "SMS__BASE_URL")?;
        }
        Ok(())
    }
}
