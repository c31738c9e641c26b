//! PostgreSQL implementation of PaymentRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{
    DomainError, ErrorCode, EventId, Money, PaymentId, PhoneNumber, TicketId, Timestamp, UserId,
};
use crate::domain::payment::{Payment, PaymentChannel, PaymentStatus};
use crate::ports::{PaymentRepository, WriteOutcome};

use super::{corrupt, db_error, is_unique_violation};

const COLUMNS: &str = "id, event_id, ticket_id, payer_id, amount_minor, status, channel, \
                       external_reference, phone_number, description, created_at, updated_at";

const REFERENCE_KEY: &str = "payments_external_reference_key";

fn select_by(column: &str) -> String {
    format!("SELECT {} FROM payments WHERE {} = $1", COLUMNS, column)
}

#[derive(Clone)]
pub struct PostgresPaymentRepository {
    pool: PgPool,
}

impl PostgresPaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    event_id: Uuid,
    ticket_id: Uuid,
    payer_id: Uuid,
    amount_minor: i64,
    status: String,
    channel: String,
    external_reference: Option<String>,
    phone_number: String,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = DomainError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(Payment {
            id: PaymentId::from_uuid(row.id),
            event_id: EventId::from_uuid(row.event_id),
            ticket_id: TicketId::from_uuid(row.ticket_id),
            payer_id: UserId::from_uuid(row.payer_id),
            amount: Money::from_minor(row.amount_minor).map_err(|e| corrupt("amount_minor", e))?,
            status: row
                .status
                .parse::<PaymentStatus>()
                .map_err(|e| corrupt("status", e))?,
            channel: row
                .channel
                .parse::<PaymentChannel>()
                .map_err(|e| corrupt("channel", e))?,
            external_reference: row.external_reference,
            phone_number: PhoneNumber::parse(&row.phone_number)
                .map_err(|e| corrupt("phone_number", e))?,
            description: row.description,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn reference_in_use(payment: &Payment) -> DomainError {
    DomainError::new(ErrorCode::Conflict, "External reference already in use").with_detail(
        "external_reference",
        payment.external_reference.clone().unwrap_or_default(),
    )
}

#[async_trait]
impl PaymentRepository for PostgresPaymentRepository {
    async fn save(&self, payment: &Payment) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO payments (
                id, event_id, ticket_id, payer_id, amount_minor, status, channel,
                external_reference, phone_number, description, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (id) DO UPDATE SET
                status = EXCLUDED.status,
                external_reference = EXCLUDED.external_reference,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(payment.event_id.as_uuid())
        .bind(payment.ticket_id.as_uuid())
        .bind(payment.payer_id.as_uuid())
        .bind(payment.amount.minor_units())
        .bind(payment.status.as_str())
        .bind(payment.channel.as_str())
        .bind(&payment.external_reference)
        .bind(payment.phone_number.as_str())
        .bind(&payment.description)
        .bind(payment.created_at.as_datetime())
        .bind(payment.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, REFERENCE_KEY) {
                return reference_in_use(payment);
            }
            db_error("save payment")(e)
        })?;

        Ok(())
    }

    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, DomainError> {
        let row: Option<PaymentRow> = sqlx::query_as(&select_by("id"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("load payment"))?;

        row.map(Payment::try_from).transpose()
    }

    async fn find_by_ticket_id(
        &self,
        ticket_id: &TicketId,
    ) -> Result<Option<Payment>, DomainError> {
        let row: Option<PaymentRow> = sqlx::query_as(&select_by("ticket_id"))
            .bind(ticket_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("load payment by ticket"))?;

        row.map(Payment::try_from).transpose()
    }

    async fn find_by_external_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Payment>, DomainError> {
        let row: Option<PaymentRow> = sqlx::query_as(&select_by("external_reference"))
            .bind(reference)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("load payment by reference"))?;

        row.map(Payment::try_from).transpose()
    }

    async fn compare_and_update(
        &self,
        payment: &Payment,
        expected: PaymentStatus,
    ) -> Result<WriteOutcome, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE payments SET status = $2, external_reference = $3, updated_at = $4
            WHERE id = $1 AND status = $5
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(payment.status.as_str())
        .bind(&payment.external_reference)
        .bind(payment.updated_at.as_datetime())
        .bind(expected.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, REFERENCE_KEY) {
                return reference_in_use(payment);
            }
            db_error("update payment")(e)
        })?;

        if result.rows_affected() == 1 {
            return Ok(WriteOutcome::Applied);
        }

        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM payments WHERE id = $1)")
                .bind(payment.id.as_uuid())
                .fetch_one(&self.pool)
                .await
                .map_err(db_error("check payment"))?;

        if exists.0 {
            Ok(WriteOutcome::Conflict)
        } else {
            Err(DomainError::new(ErrorCode::PaymentNotFound, "Payment not found")
                .with_detail("payment_id", payment.id.to_string()))
        }
    }
}
