//! Inbound gateway notification payload.

use serde::Deserialize;

/// What the gateway says happened to a collection request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayOutcome {
    Succeeded,
    Failed,
    Cancelled,
    /// Still in flight at the gateway. Not a settlement.
    Pending,
}

impl GatewayOutcome {
    /// Maps a gateway status string.
    ///
    /// Anything other than a recognised success, pending or cancellation
    /// word is treated as a failure.
    pub fn from_gateway_status(status: &str) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            "success" | "successful" | "succeeded" => GatewayOutcome::Succeeded,
            "pending" | "processing" | "created" => GatewayOutcome::Pending,
            "cancelled" | "canceled" => GatewayOutcome::Cancelled,
            _ => GatewayOutcome::Failed,
        }
    }
}

/// Callback body posted by the mobile-money gateway.
///
/// Both `camelCase` and `snake_case` field names are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GatewayNotification {
    pub status: String,

    #[serde(rename = "transactionId", alias = "transaction_id", default)]
    pub transaction_id: Option<String>,

    #[serde(default)]
    pub amount: Option<String>,

    #[serde(rename = "phoneNumber", alias = "phone_number", default)]
    pub phone_number: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Correlation reference previously returned by `initiate`.
    pub reference: String,
}

impl GatewayNotification {
    pub fn outcome(&self) -> GatewayOutcome {
        GatewayOutcome::from_gateway_status(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_body() {
        let body = r#"{"status":"success","transactionId":"tx-9","amount":"30.00","phoneNumber":"+233241234567","reference":"TIX_a_1"}"#;
        let n: GatewayNotification = serde_json::from_str(body).unwrap();
        assert_eq!(n.transaction_id.as_deref(), Some("tx-9"));
        assert_eq!(n.outcome(), GatewayOutcome::Succeeded);
    }

    #[test]
    fn parses_snake_case_body() {
        let body = r#"{"status":"FAILED","transaction_id":"tx-1","phone_number":"+1","reference":"r"}"#;
        let n: GatewayNotification = serde_json::from_str(body).unwrap();
        assert_eq!(n.phone_number.as_deref(), Some("+1"));
        assert_eq!(n.outcome(), GatewayOutcome::Failed);
    }

    #[test]
    fn reference_is_required() {
        let body = r#"{"status":"success"}"#;
        assert!(serde_json::from_str::<GatewayNotification>(body).is_err());
    }

    #[test]
    fn unknown_status_is_a_failure() {
        assert_eq!(GatewayOutcome::from_gateway_status("rejected"), GatewayOutcome::Failed);
        assert_eq!(GatewayOutcome::from_gateway_status("pending"), GatewayOutcome::Pending);
        assert_eq!(GatewayOutcome::from_gateway_status("Canceled"), GatewayOutcome::Cancelled);
    }
}
