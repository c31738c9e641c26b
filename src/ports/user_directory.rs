//! User directory port.
//!
//! Read-only access to registered users. Registration and credentials live
//! outside this service.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, PhoneNumber, Role, UserId};

/// A registered user as seen by the ticketing engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub phone: PhoneNumber,
    pub role: Role,
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserProfile>, DomainError>;

    /// Used by the USSD channel, where the caller is identified only by phone.
    async fn find_by_phone(&self, phone: &PhoneNumber) -> Result<Option<UserProfile>, DomainError>;
}
