//! Gateway request signing and webhook signature verification.
//!
//! The gateway signs with HMAC-SHA256 over the raw request body, hex encoded,
//! carried in the `X-Signature` header. Outbound requests are signed the
//! same way with the API secret.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the hex signature, inbound and outbound.
pub const SIGNATURE_HEADER: &str = "X-Signature";

/// Errors raised while authenticating a webhook.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookError {
    #[error("Missing signature")]
    MissingSignature,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Computes the lowercase hex HMAC-SHA256 of `body` under `secret`.
pub fn sign_body(secret: &[u8], body: &[u8]) -> Result<String, WebhookError> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| WebhookError::ParseError(format!("invalid HMAC key: {}", e)))?;
    mac.update(body);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verifies `X-Signature` headers against a shared secret.
pub struct WebhookSignatureVerifier {
    secret: String,
}

impl WebhookSignatureVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Checks the hex signature over the raw body.
    ///
    /// # Errors
    ///
    /// - `MissingSignature` - header absent or blank
    /// - `ParseError` - header is not hex
    /// - `InvalidSignature` - signature does not match
    pub fn verify(&self, body: &[u8], signature: Option<&str>) -> Result<(), WebhookError> {
        let signature = signature
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(WebhookError::MissingSignature)?;

        let provided = hex::decode(signature)
            .map_err(|_| WebhookError::ParseError("signature is not hex".to_string()))?;

        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| WebhookError::ParseError(format!("invalid HMAC key: {}", e)))?;
        mac.update(body);
        let expected = mac.finalize().into_bytes();

        if constant_time_compare(&expected, &provided) {
            Ok(())
        } else {
            Err(WebhookError::InvalidSignature)
        }
    }
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
