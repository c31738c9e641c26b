//! MTN MoMo collection client.
//!
//! # Request
//!
//! `POST {base}/collection/v1_0/requesttopay` with the JSON body signed by
//! HMAC-SHA256 over the exact bytes sent (`X-Signature`, lowercase hex).
//! The external id `TIX_<payment id>_<unix secs>` doubles as
//! `X-Reference-Id` and as the correlation reference stored on the payment.
//!
//! # Status
//!
//! `GET {base}/collection/v1_0/requesttopay/{reference}` returns a `status`
//! string that maps through `GatewayOutcome::from_gateway_status`.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use crate::domain::event::Event;
use crate::domain::foundation::Timestamp;
use crate::domain::payment::{sign_body, GatewayOutcome, Payment, SIGNATURE_HEADER};
use crate::ports::{CollectionHandle, GatewayError, PaymentGateway};

const SANDBOX_URL: &str = "https://sandbox.momodeveloper.mtn.com";
const PRODUCTION_URL: &str = "https://proxy.momoapi.mtn.com";

/// Target environment; selects the default base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MomoEnvironment {
    #[default]
    Sandbox,
    Production,
}

impl MomoEnvironment {
    pub fn as_str(&self) -> &'static str {
        match self {
            MomoEnvironment::Sandbox => "sandbox",
            MomoEnvironment::Production => "production",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            MomoEnvironment::Sandbox => SANDBOX_URL,
            MomoEnvironment::Production => PRODUCTION_URL,
        }
    }
}

impl fmt::Display for MomoEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MomoEnvironment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sandbox" => Ok(MomoEnvironment::Sandbox),
            "production" => Ok(MomoEnvironment::Production),
            other => Err(format!("unknown MoMo environment '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MomoConfig {
    api_key: Secret<String>,
    api_secret: Secret<String>,
    pub environment: MomoEnvironment,
    base_url: Option<String>,
    pub currency: String,
    pub callback_url: Option<String>,
    pub timeout: Duration,
}

impl MomoConfig {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            api_secret: Secret::new(api_secret.into()),
            environment: MomoEnvironment::Sandbox,
            base_url: None,
            currency: "EUR".to_string(),
            callback_url: None,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_environment(mut self, environment: MomoEnvironment) -> Self {
        self.environment = environment;
        self
    }

    /// Overrides the environment's default base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into().trim_end_matches('/').to_string());
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_callback_url(mut self, url: impl Into<String>) -> Self {
        self.callback_url = Some(url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.default_base_url())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestToPay {
    amount: String,
    currency: String,
    external_id: String,
    payer: Payer,
    payer_message: String,
    payee_note: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Payer {
    party_id_type: &'static str,
    party_id: String,
}

#[derive(Debug, Default, Deserialize)]
struct CollectionStatus {
    #[serde(default)]
    status: Option<String>,
}

pub struct MomoGateway {
    config: MomoConfig,
    client: Client,
}

impl MomoGateway {
    pub fn new(config: MomoConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    fn collection_url(&self) -> String {
        format!("{}/collection/v1_0/requesttopay", self.config.base_url())
    }

    fn external_id(payment: &Payment, at: Timestamp) -> String {
        format!("TIX_{}_{}", payment.id, at.as_unix_secs())
    }

    fn request_body(&self, payment: &Payment, event: &Event, external_id: &str) -> RequestToPay {
        RequestToPay {
            amount: payment.amount.to_decimal_string(),
            currency: self.config.currency.clone(),
            external_id: external_id.to_string(),
            payer: Payer {
                party_id_type: "MSISDN",
                party_id: payment.phone_number.as_str().trim_start_matches('+').to_string(),
            },
            payer_message: format!("Payment for {}", event.title),
            payee_note: format!("Ticket purchase for {}", event.title),
        }
    }
}

fn network(e: reqwest::Error) -> GatewayError {
    GatewayError::Network(e.to_string())
}

#[async_trait]
impl PaymentGateway for MomoGateway {
    async fn initiate(
        &self,
        payment: &Payment,
        event: &Event,
    ) -> Result<CollectionHandle, GatewayError> {
        let external_id = Self::external_id(payment, Timestamp::now());
        let body = serde_json::to_vec(&self.request_body(payment, event, &external_id))
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        let signature = sign_body(self.config.api_secret.expose_secret().as_bytes(), &body)
            .map_err(|e| GatewayError::Signing(e.to_string()))?;

        let mut request = self
            .client
            .post(self.collection_url())
            .bearer_auth(self.config.api_key.expose_secret())
            .header("Content-Type", "application/json")
            .header("X-Reference-Id", &external_id)
            .header("X-Target-Environment", self.config.environment.as_str())
            .header(SIGNATURE_HEADER, signature);
        if let Some(callback) = &self.config.callback_url {
            request = request.header("X-Callback-Url", callback);
        }

        let response = request.body(body).send().await.map_err(network)?;
        let status = response.status();
        let text = response.text().await.map_err(network)?;

        if !status.is_success() {
            tracing::warn!(
                payment_id = %payment.id,
                status = status.as_u16(),
                "MoMo rejected collection request"
            );
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                message: text,
            });
        }

        // An accepted request usually has an empty body.
        let parsed: CollectionStatus = if text.trim().is_empty() {
            CollectionStatus::default()
        } else {
            serde_json::from_str(&text).map_err(|e| GatewayError::InvalidResponse(e.to_string()))?
        };

        tracing::info!(
            payment_id = %payment.id,
            reference = %external_id,
            "MoMo collection requested"
        );

        Ok(CollectionHandle {
            reference: external_id,
            status: parsed.status.unwrap_or_else(|| "PENDING".to_string()),
        })
    }

    async fn status(&self, reference: &str) -> Result<GatewayOutcome, GatewayError> {
        let response = self
            .client
            .get(format!("{}/{}", self.collection_url(), reference))
            .bearer_auth(self.config.api_key.expose_secret())
            .header("X-Target-Environment", self.config.environment.as_str())
            .send()
            .await
            .map_err(network)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(GatewayError::UnknownReference(reference.to_string()));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: CollectionStatus = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        let raw = body
            .status
            .ok_or_else(|| GatewayError::InvalidResponse("missing status".to_string()))?;
        Ok(GatewayOutcome::from_gateway_status(&raw))
    }
}
