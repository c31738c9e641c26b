//! Feature flags configuration

use serde::Deserialize;

/// Channel toggles and diagnostics
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureFlags {
    /// Accept USSD aggregator callbacks
    #[serde(default = "enabled")]
    pub enable_ussd: bool,

    /// Send notifications through the SMS provider; otherwise log them
    #[serde(default = "enabled")]
    pub enable_sms: bool,

    /// Serve ticket passes (QR images)
    #[serde(default = "enabled")]
    pub enable_qr: bool,

    /// Show detailed error messages (disable in production!)
    #[serde(default)]
    pub verbose_errors: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            enable_ussd: true,
            enable_sms: true,
            enable_qr: true,
            verbose_errors: false,
        }
    }
}

fn enabled() -> bool {
    true
}
