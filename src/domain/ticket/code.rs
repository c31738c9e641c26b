//! Human-presentable ticket codes.
//!
//! Format: `TIX-<yyyymmddHHMMSS>-<8 lowercase hex>`, e.g.
//! `TIX-20261019143000-9f2c41ab`. Uniqueness is enforced by storage.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::foundation::{Timestamp, ValidationError};

const PREFIX: &str = "TIX";
const STAMP_LEN: usize = 14;
const SUFFIX_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TicketCode(String);

impl TicketCode {
    /// Generates a fresh code stamped with `at`.
    pub fn generate(at: Timestamp) -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!(
            "{}-{}-{}",
            PREFIX,
            at.format("%Y%m%d%H%M%S"),
            &suffix[..SUFFIX_LEN]
        ))
    }

    /// Parses a code entered by a person (surrounding whitespace ignored).
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ValidationError::empty_field("ticket_code"));
        }

        let mut parts = raw.split('-');
        let well_formed = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(prefix), Some(stamp), Some(suffix), None) => {
                prefix == PREFIX
                    && stamp.len() == STAMP_LEN
                    && stamp.chars().all(|c| c.is_ascii_digit())
                    && suffix.len() == SUFFIX_LEN
                    && suffix.chars().all(|c| c.is_ascii_hexdigit())
            }
            _ => false,
        };

        if !well_formed {
            return Err(ValidationError::invalid_format(
                "ticket_code",
                "expected TIX-<yyyymmddHHMMSS>-<8 hex>",
            ));
        }

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TicketCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TicketCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TicketCode> for String {
    fn from(code: TicketCode) -> Self {
        code.0
    }
}
