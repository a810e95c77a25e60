//! # Customer Repository
//!
//! Customer lookups plus the credit top-up path. Like stock, credit only
//! moves through the ledger ([`crate::ledger::credit::adjust_credit`]).

use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::engine::unit::WriteUnit;
use crate::error::DbResult;
use crate::ledger::credit::adjust_credit;
use tally_core::validation::{validate_delta, validate_id};
use tally_core::{Customer, LedgerDirection, MovementReason};

/// Fetches a customer by id on any executor.
pub(crate) async fn fetch_customer<'e, E>(executor: E, id: &str) -> DbResult<Option<Customer>>
where
    E: SqliteExecutor<'e>,
{
    let customer = sqlx::query_as::<_, Customer>(
        r#"
        SELECT id, name, credit_balance_cents, created_at, updated_at
        FROM customers
        WHERE id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(customer)
}

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        fetch_customer(&self.pool, id).await
    }

    /// Inserts a new customer with its opening balance.
    pub async fn insert(&self, customer: &Customer) -> DbResult<Customer> {
        debug!(id = %customer.id, "Inserting customer");

        validate_id("customerId", &customer.id)?;

        sqlx::query(
            r#"
            INSERT INTO customers (id, name, credit_balance_cents, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(customer.credit_balance_cents)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(customer.clone())
    }

    /// Adds store credit, returning the new balance in cents.
    pub async fn top_up(&self, id: &str, amount_cents: i64) -> DbResult<i64> {
        validate_delta("amount", amount_cents)?;

        let mut unit = WriteUnit::begin(&self.pool).await?;
        let result = adjust_credit(
            unit.conn(),
            id,
            amount_cents,
            LedgerDirection::Increase,
            MovementReason::TopUp,
            None,
        )
        .await;

        unit.finish(result).await
    }
}
