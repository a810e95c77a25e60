//! # Sale Line Repository
//!
//! SQL for the `sale_lines` table.
//!
//! ## Sale Line Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Line Lifecycle                               │
//! │                                                                         │
//! │  1. INSERT (coordinator, inside the checkout unit)                     │
//! │     └── insert_line() → SaleLine { status: PAID, line_no: n }          │
//! │                                                                         │
//! │  2. READ (reader, receipts, audits)                                    │
//! │     └── fetch_batch_lines() → lines ordered by line_no                 │
//! │                                                                         │
//! │  3. STATUS CHANGE (status processor, inside its own unit)              │
//! │     └── update_status() → payment_status, notes, updated_at            │
//! │                                                                         │
//! │  Price, quantity and totals are never updated.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use tally_core::{PaymentStatus, SaleLine};

const LINE_COLUMNS: &str = r#"
    id, batch_key, product_id, product_name, quantity,
    unit_price_cents, line_total_cents, customer_id, seller_id,
    payment_status, payment_method, credit_applied_cents, notes,
    created_at, updated_at
"#;

/// Inserts one line at position `line_no` of its batch.
pub(crate) async fn insert_line<'e, E>(executor: E, line: &SaleLine, line_no: i64) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    debug!(batch_key = %line.batch_key, line_no, product_id = %line.product_id, "Inserting sale line");

    sqlx::query(
        r#"
        INSERT INTO sale_lines (
            id, batch_key, line_no, product_id, product_name, quantity,
            unit_price_cents, line_total_cents, customer_id, seller_id,
            payment_status, payment_method, credit_applied_cents, notes,
            created_at, updated_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6,
            ?7, ?8, ?9, ?10,
            ?11, ?12, ?13, ?14,
            ?15, ?16
        )
        "#,
    )
    .bind(&line.id)
    .bind(&line.batch_key)
    .bind(line_no)
    .bind(&line.product_id)
    .bind(&line.product_name)
    .bind(line.quantity)
    .bind(line.unit_price_cents)
    .bind(line.line_total_cents)
    .bind(&line.customer_id)
    .bind(&line.seller_id)
    .bind(line.payment_status)
    .bind(line.payment_method)
    .bind(line.credit_applied_cents)
    .bind(&line.notes)
    .bind(line.created_at)
    .bind(line.updated_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// Fetches one line by id.
pub(crate) async fn fetch_line<'e, E>(executor: E, id: &str) -> DbResult<Option<SaleLine>>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!("SELECT {} FROM sale_lines WHERE id = ?1", LINE_COLUMNS);

    let line = sqlx::query_as::<_, SaleLine>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(line)
}

/// Fetches every line of a batch in submission order.
pub(crate) async fn fetch_batch_lines<'e, E>(executor: E, batch_key: &str) -> DbResult<Vec<SaleLine>>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!(
        "SELECT {} FROM sale_lines WHERE batch_key = ?1 ORDER BY line_no",
        LINE_COLUMNS
    );

    let lines = sqlx::query_as::<_, SaleLine>(&sql)
        .bind(batch_key)
        .fetch_all(executor)
        .await?;

    Ok(lines)
}

/// Writes a new status and notes for one line.
pub(crate) async fn update_status<'e, E>(
    executor: E,
    id: &str,
    status: PaymentStatus,
    notes: Option<&str>,
    now: DateTime<Utc>,
) -> DbResult<()>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        UPDATE sale_lines
        SET payment_status = ?2, notes = ?3, updated_at = ?4
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .bind(status)
    .bind(notes)
    .bind(now)
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("SaleLine", id));
    }

    Ok(())
}

/// Repository for read-only sale line access outside write units.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale line by ID.
    pub async fn get_line(&self, id: &str) -> DbResult<Option<SaleLine>> {
        fetch_line(&self.pool, id).await
    }

    /// Gets every line of a batch, in submission order. Empty if the key is
    /// unknown.
    pub async fn lines_for_batch(&self, batch_key: &str) -> DbResult<Vec<SaleLine>> {
        fetch_batch_lines(&self.pool, batch_key).await
    }

    /// Counts lines across all batches (for diagnostics and tests).
    pub async fn count_lines(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_lines")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Helper to generate a new sale line ID.
pub fn generate_line_id() -> String {
    Uuid::new_v4().to_string()
}
