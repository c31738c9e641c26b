//! QR rendering through an HTTP image service.
//!
//! Requests `GET {base_url}?size={n}x{n}&data={code}` and expects PNG bytes
//! back. Any service speaking that query shape works (the default is the
//! public goqr.me endpoint).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::domain::ticket::TicketCode;
use crate::ports::{RenderError, RenderedImage, TicketCodeRenderer};

const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G'];

#[derive(Debug, Clone)]
pub struct QrConfig {
    pub base_url: String,
    pub size: u32,
    pub timeout: Duration,
}

impl Default for QrConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.qrserver.com/v1/create-qr-code/".to_string(),
            size: 256,
            timeout: Duration::from_secs(10),
        }
    }
}

pub struct HttpQrRenderer {
    config: QrConfig,
    client: Client,
}

impl HttpQrRenderer {
    pub fn new(config: QrConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    fn query(&self, code: &TicketCode) -> [(&'static str, String); 3] {
        [
            ("size", format!("{0}x{0}", self.config.size)),
            ("format", "png".to_string()),
            ("data", code.as_str().to_string()),
        ]
    }
}

fn check_png(bytes: Vec<u8>) -> Result<RenderedImage, RenderError> {
    if bytes.starts_with(PNG_MAGIC) {
        Ok(RenderedImage::png(bytes))
    } else {
        Err(RenderError::InvalidImage(format!(
            "expected PNG data, got {} bytes",
            bytes.len()
        )))
    }
}

#[async_trait]
impl TicketCodeRenderer for HttpQrRenderer {
    async fn render(&self, code: &TicketCode) -> Result<RenderedImage, RenderError> {
        let response = self
            .client
            .get(&self.config.base_url)
            .query(&self.query(code))
            .send()
            .await
            .map_err(|e| RenderError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::Unavailable(format!(
                "renderer returned status {}",
                status.as_u16()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RenderError::Unavailable(e.to_string()))?;
        check_png(bytes.to_vec())
    }
}
