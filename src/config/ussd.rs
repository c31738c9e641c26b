//! USSD channel configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Menu copy and paging for the USSD channel
#[derive(Debug, Clone, Deserialize)]
pub struct UssdConfig {
    /// Short code advertised to callers, e.g. `*384*123#`
    #[serde(default = "default_service_code")]
    pub service_code: String,

    /// Events listed per menu screen
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    #[serde(default = "default_brand")]
    pub brand: String,

    #[serde(default = "default_support_phone")]
    pub support_phone: String,

    #[serde(default = "default_support_email")]
    pub support_email: String,
}

impl Default for UssdConfig {
    fn default() -> Self {
        Self {
            service_code: default_service_code(),
            page_size: default_page_size(),
            brand: default_brand(),
            support_phone: default_support_phone(),
            support_email: default_support_email(),
        }
    }
}

impl UssdConfig {
    /// Menu selections are single digits, so at most nine events fit.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.page_size == 0 || self.page_size > 9 {
            return Err(ValidationError::InvalidPageSize);
        }
        if self.brand.trim().is_empty() {
            return Err(ValidationError::MissingRequired("USSD__BRAND"));
        }
        Ok(())
    }
}

fn default_service_code() -> String {
    "*384*123#".to_string()
}

fn default_page_size() -> usize {
    5
}

fn default_brand() -> String {
    "EventTix".to_string()
}

fn default_support_phone() -> String {
    "+1234567890".to_string()
}

fn default_support_email() -> String {
    "support@eventtix.com".to_string()
}
