//! # Inventory Ledger
//!
//! The single place where `products.stock` changes.
//!
//! ## Floor at Zero
//! ```text
//! adjust_stock(id, 3, Decrease)
//!      │
//!      ▼
//! UPDATE products SET stock = stock - 3
//!  WHERE id = ? AND stock >= 3          ← one statement, no read-modify-write
//! RETURNING stock
//!      │
//!      ├── row returned   → stock_movements row (-3, stock_after), Ok(stock_after)
//!      └── no row         → product exists?  no  → ProductNotFound
//!                                            yes → InsufficientStock { available }
//! ```
//! The conditional update never partially applies. The CHECK (stock >= 0)
//! constraint on the table is a second line of defence.

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;
use tally_core::validation::validate_delta;
use tally_core::{CoreError, LedgerDirection, MovementReason};

/// Adjusts a product's stock by `delta` (a positive magnitude) and records
/// the movement, returning the resulting stock.
///
/// Runs on the caller's connection, inside the caller's write unit.
pub async fn adjust_stock(
    conn: &mut SqliteConnection,
    product_id: &str,
    delta: i64,
    direction: LedgerDirection,
    reason: MovementReason,
    reference: Option<&str>,
) -> DbResult<i64> {
    validate_delta("quantity", delta)?;

    debug!(product_id = %product_id, delta, ?direction, ?reason, "Adjusting stock");

    let now = Utc::now();

    let stock_after: Option<i64> = match direction {
        LedgerDirection::Decrease => {
            sqlx::query_scalar(
                r#"
                UPDATE products
                SET stock = stock - ?2, updated_at = ?3
                WHERE id = ?1 AND stock >= ?2
                RETURNING stock
                "#,
            )
            .bind(product_id)
            .bind(delta)
            .bind(now)
            .fetch_optional(&mut *conn)
            .await?
        }
        LedgerDirection::Increase => {
            sqlx::query_scalar(
                r#"
                UPDATE products
                SET stock = stock + ?2, updated_at = ?3
                WHERE id = ?1
                RETURNING stock
                "#,
            )
            .bind(product_id)
            .bind(delta)
            .bind(now)
            .fetch_optional(&mut *conn)
            .await?
        }
    };

    let Some(stock_after) = stock_after else {
        return Err(explain_miss(conn, product_id, delta).await);
    };

    sqlx::query(
        r#"
        INSERT INTO stock_movements (product_id, delta, stock_after, reason, reference, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(product_id)
    .bind(direction.signed(delta))
    .bind(stock_after)
    .bind(reason)
    .bind(reference)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(stock_after)
}

/// Works out why a conditional update touched no row.
async fn explain_miss(conn: &mut SqliteConnection, product_id: &str, requested: i64) -> crate::DbError {
    let available: Result<Option<i64>, sqlx::Error> =
        sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
            .bind(product_id)
            .fetch_optional(&mut *conn)
            .await;

    match available {
        Ok(Some(available)) => CoreError::InsufficientStock {
            product_id: product_id.to_string(),
            available,
            requested,
        }
        .into(),
        Ok(None) => CoreError::ProductNotFound(product_id.to_string()).into(),
        Err(err) => err.into(),
    }
}
