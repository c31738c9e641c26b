//! Ticket code renderer port (QR images).

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

use crate::domain::ticket::TicketCode;

/// A rendered image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl RenderedImage {
    pub fn png(bytes: Vec<u8>) -> Self {
        Self {
            content_type: "image/png".to_string(),
            bytes,
        }
    }

    /// `data:<content type>;base64,<payload>`
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.content_type, STANDARD.encode(&self.bytes))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("renderer unreachable: {0}")]
    Unavailable(String),

    #[error("renderer returned an invalid image: {0}")]
    InvalidImage(String),
}

#[async_trait]
pub trait TicketCodeRenderer: Send + Sync {
    async fn render(&self, code: &TicketCode) -> Result<RenderedImage, RenderError>;
}
