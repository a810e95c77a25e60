//! # Transaction Coordinator
//!
//! Turns a cart into committed sale lines, all or nothing.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  commit_checkout(capability, request)                                  │
//! │                                                                         │
//! │  capability.require_seller()     ── Forbidden                          │
//! │  request.validate()              ── EmptyCart / CartTooLarge / shape   │
//! │  batch_key = TX-<ts>-<uuid>                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌───────────── BEGIN IMMEDIATE ─────────────────────────────────┐     │
//! │  │ customer? → fetch           ── CustomerNotFound                │     │
//! │  │                                                                │     │
//! │  │ for item in items (submission order):                          │     │
//! │  │     product = fetch (sees earlier in-batch decrements)         │     │
//! │  │     validate_line            ── ProductNotFound / Inactive /   │     │
//! │  │                                 InsufficientStock              │     │
//! │  │     adjust_stock(-qty)       ── InsufficientStock              │     │
//! │  │                                                                │     │
//! │  │ credit = min(balance, total) → adjust_credit(-credit)          │     │
//! │  │ insert one sale_line per item (credit on line 0)               │     │
//! │  └─────── COMMIT ─── or ── ROLLBACK on the first error ───────────┘     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SaleBatch { total, item_count, credit_applied, PAID, low_stock }      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{info, warn};

use crate::engine::unit::WriteUnit;
use crate::error::DbResult;
use crate::ledger::credit::adjust_credit;
use crate::ledger::inventory::adjust_stock;
use crate::repository::customer::fetch_customer;
use crate::repository::product::fetch_product;
use crate::repository::sale::{generate_line_id, insert_line};
use tally_core::batch::generate_batch_key;
use tally_core::checkout::{credit_to_apply, validate_line, ValidatedLine};
use tally_core::{
    Capability, CheckoutRequest, CoreError, Customer, LedgerDirection, Money, MovementReason,
    PaymentStatus, SaleBatch, SaleLine, ValidationError,
};

/// Commits checkouts against the shared inventory and credit state.
#[derive(Debug, Clone)]
pub struct TransactionCoordinator {
    pool: SqlitePool,
}

impl TransactionCoordinator {
    pub fn new(pool: SqlitePool) -> Self {
        TransactionCoordinator { pool }
    }

    /// Validates and commits a cart as one atomic unit.
    ///
    /// On any error nothing is persisted: no line, no stock movement, no
    /// credit movement. The error names the offending product or customer.
    pub async fn commit_checkout(
        &self,
        capability: &Capability,
        request: CheckoutRequest,
    ) -> DbResult<SaleBatch> {
        capability.require_seller()?;
        request.validate()?;

        let now = Utc::now();
        let batch_key = generate_batch_key(now);

        let mut unit = WriteUnit::begin(&self.pool).await?;
        let result = apply_checkout(unit.conn(), capability, &request, &batch_key, now).await;
        let batch = unit.finish(result).await?;

        info!(
            batch_key = %batch.batch_key,
            lines = batch.line_count,
            total_cents = batch.total_cents,
            credit_applied_cents = batch.credit_applied_cents,
            seller_id = %capability.user_id,
            "Checkout committed"
        );

        for product_id in &batch.low_stock {
            warn!(product_id = %product_id, batch_key = %batch.batch_key, "Product at or below minimum stock");
        }

        Ok(batch)
    }
}

/// Everything between BEGIN IMMEDIATE and COMMIT.
async fn apply_checkout(
    conn: &mut SqliteConnection,
    capability: &Capability,
    request: &CheckoutRequest,
    batch_key: &str,
    now: DateTime<Utc>,
) -> DbResult<SaleBatch> {
    let customer: Option<Customer> = match &request.customer_id {
        Some(id) => Some(
            fetch_customer(&mut *conn, id)
                .await?
                .ok_or_else(|| CoreError::CustomerNotFound(id.clone()))?,
        ),
        None => None,
    };

    let mut validated: Vec<ValidatedLine> = Vec::with_capacity(request.items.len());
    let mut low_stock: Vec<String> = Vec::new();

    for item in &request.items {
        let product = fetch_product(&mut *conn, &item.product_id).await?;
        let line = validate_line(item, product.as_ref())?;

        let stock_after = adjust_stock(
            &mut *conn,
            &line.product_id,
            line.quantity,
            LedgerDirection::Decrease,
            MovementReason::Sale,
            Some(batch_key),
        )
        .await?;

        let min_stock = product.map(|p| p.min_stock).unwrap_or_default();
        if stock_after <= min_stock && !low_stock.contains(&line.product_id) {
            low_stock.push(line.product_id.clone());
        }

        validated.push(line);
    }

    let total = validated
        .iter()
        .try_fold(0i64, |acc, line| acc.checked_add(line.line_total.cents()))
        .map(Money::from_cents)
        .ok_or_else(|| ValidationError::InvalidFormat {
            field: "items".to_string(),
            reason: "cart total is too large".to_string(),
        })?;

    let mut credit_applied = Money::zero();
    if let Some(customer) = &customer {
        credit_applied = credit_to_apply(customer.credit_balance(), total);
        if credit_applied.is_positive() {
            adjust_credit(
                &mut *conn,
                &customer.id,
                credit_applied.cents(),
                LedgerDirection::Decrease,
                MovementReason::Sale,
                Some(batch_key),
            )
            .await?;
        }
    }

    let mut lines = Vec::with_capacity(validated.len());
    for (line_no, line) in validated.into_iter().enumerate() {
        let sale_line = SaleLine {
            id: generate_line_id(),
            batch_key: batch_key.to_string(),
            product_id: line.product_id,
            product_name: line.product_name,
            quantity: line.quantity,
            unit_price_cents: line.unit_price.cents(),
            line_total_cents: line.line_total.cents(),
            customer_id: request.customer_id.clone(),
            seller_id: Some(capability.user_id.clone()),
            payment_status: PaymentStatus::Paid,
            payment_method: request.payment_method,
            credit_applied_cents: if line_no == 0 { credit_applied.cents() } else { 0 },
            notes: request.notes.clone(),
            created_at: now,
            updated_at: now,
        };

        insert_line(&mut *conn, &sale_line, line_no as i64).await?;
        lines.push(sale_line);
    }

    let mut batch = SaleBatch::from_lines(batch_key, lines, customer.map(|c| c.name))?;
    batch.low_stock = low_stock;

    Ok(batch)
}
