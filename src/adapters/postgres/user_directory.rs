//! PostgreSQL implementation of UserDirectory.
//!
//! Read-only; accounts are created by the registration service.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, PhoneNumber, Role, UserId};
use crate::ports::{UserDirectory, UserProfile};

use super::{corrupt, db_error};

#[derive(Clone)]
pub struct PostgresUserDirectory {
    pool: PgPool,
}

impl PostgresUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    phone: String,
    role: String,
}

impl TryFrom<UserRow> for UserProfile {
    type Error = DomainError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(UserProfile {
            id: UserId::from_uuid(row.id),
            name: row.name,
            phone: PhoneNumber::parse(&row.phone).map_err(|e| corrupt("phone", e))?,
            role: row.role.parse::<Role>().map_err(|e| corrupt("role", e))?,
        })
    }
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserProfile>, DomainError> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, name, phone, role FROM users WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("load user"))?;

        row.map(UserProfile::try_from).transpose()
    }

    async fn find_by_phone(&self, phone: &PhoneNumber) -> Result<Option<UserProfile>, DomainError> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, name, phone, role FROM users WHERE phone = $1")
                .bind(phone.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("load user by phone"))?;

        row.map(UserProfile::try_from).transpose()
    }
}
