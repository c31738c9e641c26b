//! QR renderer configuration

use serde::Deserialize;

use super::error::ValidationError;
use super::gateway::check_http_url;

/// Image service used for ticket passes
#[derive(Debug, Clone, Deserialize)]
pub struct QrSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Edge length in pixels
    #[serde(default = "default_size")]
    pub size: u32,
}

impl Default for QrSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            size: default_size(),
        }
    }
}

impl QrSettings {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_http_url(&self.base_url, "QR__BASE_URL")
    }
}

fn default_base_url() -> String {
    "https://api.qrserver.com/v1/create-qr-code/".to_string()
}

fn default_size() -> u32 {
    256
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_public_service() {
        let settings = QrSettings::default();
        assert_eq!(settings.size, 256);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn non_http_url_is_rejected() {
        let settings = QrSettings {
            base_url: "file:///tmp/qr".to_string(),
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }
}
