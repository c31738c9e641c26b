//! Closed set of user roles and the capabilities they grant.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Role attached to an authenticated identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular ticket buyer.
    User,
    /// Runs events; staffs the venue door.
    Organizer,
    /// Platform operator.
    Admin,
}

/// Operations that require more than resource ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Cancel or refund a ticket owned by someone else.
    CancelAnyTicket,
    /// Admit tickets at the venue.
    VerifyTickets,
    /// Read a ticket owned by someone else (including its pass).
    ViewAnyTicket,
}

impl Role {
    /// Returns true if this role grants the capability.
    pub fn can(&self, capability: Capability) -> bool {
        match capability {
            Capability::CancelAnyTicket | Capability::VerifyTickets | Capability::ViewAnyTicket => {
                self.is_elevated()
            }
        }
    }

    /// Organizer and admin are elevated; plain users are not.
    pub fn is_elevated(&self) -> bool {
        matches!(self, Role::Organizer | Role::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Organizer => "organizer",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "organizer" => Ok(Role::Organizer),
            "admin" => Ok(Role::Admin),
            other => Err(ValidationError::invalid_format(
                "role",
                format!("unknown role '{}'", other),
            )),
        }
    }
}
