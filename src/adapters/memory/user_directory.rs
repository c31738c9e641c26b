//! In-memory user directory.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, PhoneNumber, UserId};
use crate::ports::{UserDirectory, UserProfile};

#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<UserId, UserProfile>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, profile: UserProfile) {
        self.users.write().await.insert(profile.id, profile);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserProfile>, DomainError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_phone(&self, phone: &PhoneNumber) -> Result<Option<UserProfile>, DomainError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| &u.phone == phone)
            .cloned())
    }
}
