//! PostgreSQL implementation of TicketRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    DomainError, ErrorCode, EventId, Money, TicketId, Timestamp, UserId,
};
use crate::domain::ticket::{Ticket, TicketCode, TicketStatus};
use crate::ports::{TicketRepository, WriteOutcome};

use super::{corrupt, db_error, from_count, is_unique_violation, to_count};

const COLUMNS: &str = "id, event_id, owner_id, code, quantity, price_minor, status, used_at, \
                       created_at, updated_at";

#[derive(Clone)]
pub struct PostgresTicketRepository {
    pool: PgPool,
}

impl PostgresTicketRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TicketRow {
    id: Uuid,
    event_id: Uuid,
    owner_id: Uuid,
    code: String,
    quantity: i32,
    price_minor: i64,
    status: String,
    used_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TicketRow> for Ticket {
    type Error = DomainError;

    fn try_from(row: TicketRow) -> Result<Self, Self::Error> {
        Ok(Ticket {
            id: TicketId::from_uuid(row.id),
            event_id: EventId::from_uuid(row.event_id),
            owner_id: UserId::from_uuid(row.owner_id),
            code: TicketCode::parse(&row.code).map_err(|e| corrupt("code", e))?,
            quantity: to_count("quantity", row.quantity)?,
            price: Money::from_minor(row.price_minor).map_err(|e| corrupt("price_minor", e))?,
            status: row
                .status
                .parse::<TicketStatus>()
                .map_err(|e| corrupt("status", e))?,
            used_at: row.used_at.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[async_trait]
impl TicketRepository for PostgresTicketRepository {
    async fn save(&self, ticket: &Ticket) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO tickets (
                id, event_id, owner_id, code, quantity, price_minor, status,
                used_at, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO UPDATE SET
                status = EXCLUDED.status,
                used_at = EXCLUDED.used_at,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(ticket.id.as_uuid())
        .bind(ticket.event_id.as_uuid())
        .bind(ticket.owner_id.as_uuid())
        .bind(ticket.code.as_str())
        .bind(from_count(ticket.quantity))
        .bind(ticket.price.minor_units())
        .bind(ticket.status.as_str())
        .bind(ticket.used_at.as_ref().map(|t| *t.as_datetime()))
        .bind(ticket.created_at.as_datetime())
        .bind(ticket.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, "tickets_code_key") {
                return DomainError::new(ErrorCode::Conflict, "Duplicate ticket code")
                    .with_detail("code", ticket.code.to_string());
            }
            db_error("save ticket")(e)
        })?;

        Ok(())
    }

    async fn find_by_id(&self, id: &TicketId) -> Result<Option<Ticket>, DomainError> {
        let row: Option<TicketRow> =
            sqlx::query_as(&format!("SELECT {} FROM tickets WHERE id = $1", COLUMNS))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("load ticket"))?;

        row.map(Ticket::try_from).transpose()
    }

    async fn find_by_code(&self, code: &TicketCode) -> Result<Option<Ticket>, DomainError> {
        let row: Option<TicketRow> =
            sqlx::query_as(&format!("SELECT {} FROM tickets WHERE code = $1", COLUMNS))
                .bind(code.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("load ticket by code"))?;

        row.map(Ticket::try_from).transpose()
    }

    async fn list_recent_by_owner(
        &self,
        owner_id: &UserId,
        limit: usize,
    ) -> Result<Vec<Ticket>, DomainError> {
        let rows: Vec<TicketRow> = sqlx::query_as(&format!(
            "SELECT {} FROM tickets WHERE owner_id = $1 ORDER BY created_at DESC, id DESC LIMIT $2",
            COLUMNS
        ))
        .bind(owner_id.as_uuid())
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("list tickets"))?;

        rows.into_iter().map(Ticket::try_from).collect()
    }

    async fn compare_and_update(
        &self,
        ticket: &Ticket,
        expected: TicketStatus,
    ) -> Result<WriteOutcome, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE tickets SET status = $2, used_at = $3, updated_at = $4
            WHERE id = $1 AND status = $5
            "#,
        )
        .bind(ticket.id.as_uuid())
        .bind(ticket.status.as_str())
        .bind(ticket.used_at.as_ref().map(|t| *t.as_datetime()))
        .bind(ticket.updated_at.as_datetime())
        .bind(expected.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_error("update ticket"))?;

        if result.rows_affected() == 1 {
            return Ok(WriteOutcome::Applied);
        }

        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM tickets WHERE id = $1)")
                .bind(ticket.id.as_uuid())
                .fetch_one(&self.pool)
                .await
                .map_err(db_error("check ticket"))?;

        if exists.0 {
            Ok(WriteOutcome::Conflict)
        } else {
            Err(DomainError::new(ErrorCode::TicketNotFound, "Ticket not found")
                .with_detail("ticket_id", ticket.id.to_string()))
        }
    }
}
