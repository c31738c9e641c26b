//! Mobile money gateway configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;

/// MoMo collection API settings
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    pub api_key: SecretString,

    /// Key for the `X-Signature` request HMAC
    pub api_secret: SecretString,

    /// `sandbox` or `production`
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Overrides the environment's default base URL
    pub base_url: Option<String>,

    #[serde(default = "default_currency")]
    pub currency: String,

    /// Where the gateway posts payment notifications
    pub callback_url: Option<String>,

    /// Secret for verifying webhook signatures; unsigned webhooks are
    /// accepted when unset
    pub webhook_secret: Option<SecretString>,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl GatewayConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn webhook_secret(&self) -> Option<&str> {
        self.webhook_secret
            .as_ref()
            .map(|s| s.expose_secret().as_str())
            .filter(|s| !s.is_empty())
    }

    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.api_key.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("GATEWAY__API_KEY"));
        }
        if self.api_secret.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("GATEWAY__API_SECRET"));
        }
        match self.environment.trim().to_lowercase().as_str() {
            "sandbox" | "production" => {}
            other => return Err(ValidationError::InvalidGatewayEnvironment(other.to_string())),
        }
        if let Some(url) = &self.base_url {
            check_http_url(url, "GATEWAY__BASE_URL")?;
        }
        if let Some(url) = &self.callback_url {
            check_http_url(url, "GATEWAY__CALLBACK_URL")?;
        }
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ValidationError::InvalidCurrency);
        }
        if *environment == Environment::Production && self.webhook_secret().is_none() {
            return Err(ValidationError::MissingWebhookSecret);
        }
        Ok(())
    }
}

pub(super) fn check_http_url(url: &str, field: &'static str) -> Result<(), ValidationError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ValidationError::InvalidUrl(field))
    }
}

fn default_environment() -> String {
    "sandbox".to_string()
}

fn default_currency() -> String {
    "EUR".to_string()
}

fn default_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GatewayConfig {
        serde_json::from_str(r#"{"api_key": "key", "api_secret": "secret"}"#).unwrap()
    }

    #[test]
    fn defaults_to_sandbox_in_eur() {
        let config = config();
        assert_eq!(config.environment, "sandbox");
        assert_eq!(config.currency, "EUR");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(config.validate(&Environment::Development).is_ok());
    }

    #[test]
    fn unknown_environment_is_rejected() {
        let config = GatewayConfig {
            environment: "staging".to_string(),
            ..config()
        };
        assert!(matches!(
            config.validate(&Environment::Development),
            Err(ValidationError::InvalidGatewayEnvironment(_))
        ));
    }

    #[test]
    fn lowercase_currency_is_rejected() {
        let config = GatewayConfig {
            currency: "ugx".to_string(),
            ..config()
        };
        assert!(config.validate(&Environment::Development).is_err());
    }

    #[test]
    fn production_requires_webhook_secret() {
        assert!(matches!(
            config().validate(&Environment::Production),
            Err(ValidationError::MissingWebhookSecret)
        ));

        let signed = GatewayConfig {
            webhook_secret: Some(SecretString::new("whsec".to_string())),
            ..config()
        };
        assert!(signed.validate(&Environment::Production).is_ok());
    }

    #[test]
    fn empty_webhook_secret_counts_as_unset() {
        let config = GatewayConfig {
            webhook_secret: Some(SecretString::new(String::new())),
            ..config()
        };
        assert!(config.webhook_secret().is_none());
    }

    #[test]
    fn callback_url_must_be_http() {
        let config = GatewayConfig {
            callback_url: Some("ftp://example.com/hook".to_string()),
            ..config()
        };
        assert!(config.validate(&Environment::Development).is_err());
    }
}
