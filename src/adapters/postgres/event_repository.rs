//! PostgreSQL implementation of EventRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::event::{Event, EventStatus};
use crate::domain::foundation::{DomainError, ErrorCode, EventId, Money, Timestamp, UserId};
use crate::ports::{EventRepository, WriteOutcome};

use super::{corrupt, db_error, from_count, to_count};

const COLUMNS: &str = "id, title, description, date, location, category, unit_price_minor, \
                       capacity, sold, status, organizer_id, created_at, updated_at";

#[derive(Clone)]
pub struct PostgresEventRepository {
    pool: PgPool,
}

impl PostgresEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    title: String,
    description: String,
    date: DateTime<Utc>,
    location: String,
    category: Option<String>,
    unit_price_minor: i64,
    capacity: i32,
    sold: i32,
    status: String,
    organizer_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EventRow> for Event {
    type Error = DomainError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let capacity = to_count("capacity", row.capacity)?;
        let sold = to_count("sold", row.sold)?;
        if sold > capacity {
            return Err(corrupt("sold", format!("{} exceeds capacity {}", sold, capacity)));
        }

        Ok(Event {
            id: EventId::from_uuid(row.id),
            title: row.title,
            description: row.description,
            date: Timestamp::from_datetime(row.date),
            location: row.location,
            category: row.category,
            unit_price: Money::from_minor(row.unit_price_minor)
                .map_err(|e| corrupt("unit_price_minor", e))?,
            capacity,
            sold,
            status: row
                .status
                .parse::<EventStatus>()
                .map_err(|e| corrupt("status", e))?,
            organizer_id: UserId::from_uuid(row.organizer_id),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[async_trait]
impl EventRepository for PostgresEventRepository {
    /// Inserts or updates event details. `sold` is written on insert only.
    async fn save(&self, event: &Event) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO events (
                id, title, description, date, location, category, unit_price_minor,
                capacity, sold, status, organizer_id, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (id) DO UPDATE SET
                title = EXCLUDED.title,
                description = EXCLUDED.description,
                date = EXCLUDED.date,
                location = EXCLUDED.location,
                category = EXCLUDED.category,
                unit_price_minor = EXCLUDED.unit_price_minor,
                status = EXCLUDED.status,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(event.id.as_uuid())
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.date.as_datetime())
        .bind(&event.location)
        .bind(&event.category)
        .bind(event.unit_price.minor_units())
        .bind(from_count(event.capacity))
        .bind(from_count(event.sold))
        .bind(event.status.as_str())
        .bind(event.organizer_id.as_uuid())
        .bind(event.created_at.as_datetime())
        .bind(event.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("save event"))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &EventId) -> Result<Option<Event>, DomainError> {
        let row: Option<EventRow> =
            sqlx::query_as(&format!("SELECT {} FROM events WHERE id = $1", COLUMNS))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("load event"))?;

        row.map(Event::try_from).transpose()
    }

    async fn list_on_sale(&self, limit: usize) -> Result<Vec<Event>, DomainError> {
        let rows: Vec<EventRow> = sqlx::query_as(&format!(
            "SELECT {} FROM events WHERE status = $1 ORDER BY date ASC, id ASC LIMIT $2",
            COLUMNS
        ))
        .bind(EventStatus::Active.as_str())
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("list events"))?;

        rows.into_iter().map(Event::try_from).collect()
    }

    async fn compare_and_set_sold(
        &self,
        id: &EventId,
        expected: u32,
        new: u32,
    ) -> Result<WriteOutcome, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE events SET sold = $3, updated_at = now()
            WHERE id = $1 AND sold = $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(from_count(expected))
        .bind(from_count(new))
        .execute(&self.pool)
        .await
        .map_err(db_error("update sold count"))?;

        if result.rows_affected() == 1 {
            return Ok(WriteOutcome::Applied);
        }

        let exists: (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM events WHERE id = $1)")
            .bind(id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("check event"))?;

        if exists.0 {
            Ok(WriteOutcome::Conflict)
        } else {
            Err(DomainError::new(ErrorCode::EventNotFound, "Event not found")
                .with_detail("event_id", id.to_string()))
        }
    }
}
