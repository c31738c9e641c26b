//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables use the `EVENTTIX` prefix and
//! nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use eventtix::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod auth;
mod database;
mod error;
mod features;
mod gateway;
mod qr;
mod server;
mod sms;
mod ussd;

pub use auth::AuthConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use features::FeatureFlags;
pub use gateway::GatewayConfig;
pub use qr::QrSettings;
pub use server::{Environment, ServerConfig};
pub use sms::SmsSettings;
pub use ussd::UssdConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Built once at startup and handed to adapter and handler constructors.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    pub database: DatabaseConfig,

    pub auth: AuthConfig,

    /// Mobile money gateway
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub sms: SmsSettings,

    #[serde(default)]
    pub qr: QrSettings,

    #[serde(default)]
    pub ussd: UssdConfig,

    #[serde(default)]
    pub features: FeatureFlags,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` if present (development)
    /// 2. Reads variables with the `EVENTTIX` prefix
    /// 3. Splits nested keys on `__`
    ///
    /// - `EVENTTIX__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `EVENTTIX__GATEWAY__API_KEY=...` -> `gateway.api_key = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("EVENTTIX")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Semantic validation across all sections.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let environment = &self.server.environment;
        self.server.validate()?;
        self.database.validate()?;
        self.auth.validate(environment)?;
        self.gateway.validate(environment)?;
        self.sms.validate(self.features.enable_sms)?;
        if self.features.enable_qr {
            self.qr.validate()?;
        }
        self.ussd.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
