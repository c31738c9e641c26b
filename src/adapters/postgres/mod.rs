//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresEventRepository` - events, with the ledger's compare-and-set on `sold`
//! - `PostgresTicketRepository` - tickets, with status-guarded updates
//! - `PostgresPaymentRepository` - payments, unique by external reference
//! - `PostgresUserDirectory` - registered users, looked up by phone
//!
//! Money columns hold minor units (`*_minor BIGINT`). Counts are `INTEGER`
//! and are checked on the way back into `u32`.

mod event_repository;
mod payment_repository;
mod ticket_repository;
mod user_directory;

pub use event_repository::PostgresEventRepository;
pub use payment_repository::PostgresPaymentRepository;
pub use ticket_repository::PostgresTicketRepository;
pub use user_directory::PostgresUserDirectory;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Pool sizing and timeouts.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
}

/// Opens a connection pool.
pub async fn connect(url: &str, settings: &PoolSettings) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(settings.connect_timeout)
        .idle_timeout(settings.idle_timeout)
        .connect(url)
        .await
}

/// Applies the migrations under `migrations/`.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

fn db_error(action: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
    move |e| DomainError::new(ErrorCode::DatabaseError, format!("Failed to {}: {}", action, e))
}

/// Error for a stored value that no longer satisfies the domain type.
fn corrupt(column: &str, reason: impl std::fmt::Display) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Invalid {} in database: {}", column, reason),
    )
}

fn to_count(column: &str, value: i32) -> Result<u32, DomainError> {
    u32::try_from(value).map_err(|_| corrupt(column, value))
}

fn from_count(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn is_unique_violation(e: &sqlx::Error, constraint: &str) -> bool {
    match e {
        sqlx::Error::Database(db_err) => {
            db_err.is_unique_violation() && db_err.constraint() == Some(constraint)
        }
        _ => false,
    }
}
