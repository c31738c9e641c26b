//! Authentication types for the domain layer.
//!
//! These types represent an authenticated caller extracted from a bearer token.
//! They have **no external dependencies** - any identity provider can populate
//! them via the `SessionValidator` port. The engine only needs `{id, role}`.

use super::{Capability, DomainError, ErrorCode, Role, UserId};
use thiserror::Error;

/// Authenticated caller extracted from a validated token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// The unique user identifier from the identity provider.
    pub id: UserId,

    /// Role used for capability checks.
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    /// Fails with `Forbidden` unless the caller's role grants the capability.
    pub fn require(&self, capability: Capability) -> Result<(), DomainError> {
        if self.role.can(capability) {
            Ok(())
        } else {
            Err(
                DomainError::new(ErrorCode::Forbidden, "Insufficient permissions")
                    .with_detail("role", self.role.as_str())
                    .with_detail("capability", format!("{:?}", capability)),
            )
        }
    }
}

/// Authentication errors that can occur during token validation.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// The token is missing, malformed, or has an invalid signature.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// The token has expired.
    #[error("Token expired")]
    TokenExpired,

    /// The identity provider is unavailable.
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    /// Returns true if this is a transient error that may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::ServiceUnavailable(_))
    }
}
