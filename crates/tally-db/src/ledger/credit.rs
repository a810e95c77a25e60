//! # Credit Ledger
//!
//! The single place where `customers.credit_balance_cents` changes. Same
//! shape as the inventory ledger: one conditional UPDATE that either
//! applies fully or touches no row, then an audit row in
//! `credit_movements`.

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::{DbError, DbResult};
use tally_core::validation::validate_delta;
use tally_core::{CoreError, LedgerDirection, MovementReason};

/// Adjusts a customer's credit by `delta_cents` (a positive magnitude) and
/// records the movement, returning the resulting balance in cents.
///
/// Decreasing below zero fails with `InvalidCreditOperation` and changes
/// nothing.
pub async fn adjust_credit(
    conn: &mut SqliteConnection,
    customer_id: &str,
    delta_cents: i64,
    direction: LedgerDirection,
    reason: MovementReason,
    reference: Option<&str>,
) -> DbResult<i64> {
    validate_delta("amount", delta_cents)?;

    debug!(customer_id = %customer_id, delta_cents, ?direction, ?reason, "Adjusting credit");

    let now = Utc::now();

    let balance_after: Option<i64> = match direction {
        LedgerDirection::Decrease => {
            sqlx::query_scalar(
                r#"
                UPDATE customers
                SET credit_balance_cents = credit_balance_cents - ?2, updated_at = ?3
                WHERE id = ?1 AND credit_balance_cents >= ?2
                RETURNING credit_balance_cents
                "#,
            )
            .bind(customer_id)
            .bind(delta_cents)
            .bind(now)
            .fetch_optional(&mut *conn)
            .await?
        }
        LedgerDirection::Increase => {
            sqlx::query_scalar(
                r#"
                UPDATE customers
                SET credit_balance_cents = credit_balance_cents + ?2, updated_at = ?3
                WHERE id = ?1
                RETURNING credit_balance_cents
                "#,
            )
            .bind(customer_id)
            .bind(delta_cents)
            .bind(now)
            .fetch_optional(&mut *conn)
            .await?
        }
    };

    let Some(balance_after) = balance_after else {
        let balance: Option<i64> =
            sqlx::query_scalar("SELECT credit_balance_cents FROM customers WHERE id = ?1")
                .bind(customer_id)
                .fetch_optional(&mut *conn)
                .await?;

        let err = match balance {
            Some(balance_cents) => CoreError::InvalidCreditOperation {
                customer_id: customer_id.to_string(),
                balance_cents,
                requested_cents: delta_cents,
            },
            None => CoreError::CustomerNotFound(customer_id.to_string()),
        };
        return Err(DbError::Domain(err));
    };

    sqlx::query(
        r#"
        INSERT INTO credit_movements (customer_id, delta_cents, balance_after, reason, reference, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(customer_id)
    .bind(direction.signed(delta_cents))
    .bind(balance_after)
    .bind(reason)
    .bind(reference)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(balance_after)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::unit::WriteUnit;
    use crate::testing::{customer, test_db};

    #[tokio::test]
    async fn test_credit_floor() {
        let db = test_db().await;
        db.customers().insert(&customer("cust-1", 1000)).await.unwrap();

        let mut unit = WriteUnit::begin(db.pool()).await.unwrap();
        let err = adjust_credit(unit.conn(), "cust-1", 1500, LedgerDirection::Decrease, MovementReason::Sale, None)
            .await
            .unwrap_err();
        let after = adjust_credit(unit.conn(), "cust-1", 1000, LedgerDirection::Decrease, MovementReason::Sale, Some("TX-1"))
            .await
            .unwrap();
        unit.commit().await.unwrap();

        assert_eq!(
            err.as_domain(),
            Some(&CoreError::InvalidCreditOperation {
                customer_id: "cust-1".to_string(),
                balance_cents: 1000,
                requested_cents: 1500,
            })
        );
        assert_eq!(after, 0);

        let audit: Vec<(i64, i64)> =
            sqlx::query_as("SELECT delta_cents, balance_after FROM credit_movements WHERE customer_id = 'cust-1'")
                .fetch_all(db.pool())
                .await
                .unwrap();
        assert_eq!(audit, vec![(-1000, 0)]);
    }

    #[tokio::test]
    async fn test_unknown_customer() {
        let db = test_db().await;

        let mut unit = WriteUnit::begin(db.pool()).await.unwrap();
        let err = adjust_credit(unit.conn(), "ghost", 100, LedgerDirection::Increase, MovementReason::TopUp, None)
            .await
            .unwrap_err();
        unit.rollback().await.unwrap();

        assert_eq!(err.as_domain(), Some(&CoreError::CustomerNotFound("ghost".to_string())));
    }
}
