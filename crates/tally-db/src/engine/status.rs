//! # Refund / Status Processor
//!
//! Moves one sale line through the payment state machine and, on refund,
//! puts its quantity back in stock.
//!
//! ## Refund Flow
//! ```text
//! update_status(admin, line_id, REFUNDED, note)
//!      │
//!      ▼
//! BEGIN IMMEDIATE
//!      │  line = fetch(line_id)                 ── SaleLineNotFound
//!      │  prior.can_transition_to(next)?        ── InvalidStatusTransition
//!      │  prior != REFUNDED && next == REFUNDED?
//!      │      yes → adjust_stock(+quantity, refund)
//!      │      no  → (second refund: stock untouched)
//!      │  notes = notes + "\n" + note
//!      ▼
//! COMMIT
//! ```
//! The prior status is read inside the write unit, so two concurrent
//! refunds of the same line restore stock exactly once.

use chrono::Utc;
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

use crate::engine::unit::WriteUnit;
use crate::error::DbResult;
use crate::ledger::inventory::adjust_stock;
use crate::repository::sale::{fetch_line, update_status};
use tally_core::types::append_note;
use tally_core::validation::{validate_id, validate_notes};
use tally_core::{Capability, CoreError, LedgerDirection, MovementReason, PaymentStatus, SaleLine};

/// Outcome of a status change.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    /// The line as stored after the change.
    pub line: SaleLine,
    pub previous_status: PaymentStatus,
    /// True only when this call put the line's quantity back in stock.
    pub stock_restored: bool,
}

#[derive(Debug, Clone)]
pub struct StatusProcessor {
    pool: SqlitePool,
}

impl StatusProcessor {
    pub fn new(pool: SqlitePool) -> Self {
        StatusProcessor { pool }
    }

    /// Applies `next` to one line, appending `note` to its notes.
    ///
    /// Setting a line to the status it already has succeeds and leaves
    /// stock alone.
    pub async fn update_status(
        &self,
        capability: &Capability,
        line_id: &str,
        next: PaymentStatus,
        note: Option<&str>,
    ) -> DbResult<StatusChange> {
        capability.require_admin()?;
        validate_id("lineId", line_id)?;
        validate_notes(note)?;

        let mut unit = WriteUnit::begin(&self.pool).await?;
        let result = apply_status(unit.conn(), line_id, next, note).await;
        let change = unit.finish(result).await?;

        info!(
            line_id = %line_id,
            batch_key = %change.line.batch_key,
            from = %change.previous_status,
            to = %next,
            stock_restored = change.stock_restored,
            admin_id = %capability.user_id,
            "Sale line status updated"
        );

        Ok(change)
    }
}

async fn apply_status(
    conn: &mut SqliteConnection,
    line_id: &str,
    next: PaymentStatus,
    note: Option<&str>,
) -> DbResult<StatusChange> {
    let mut line = fetch_line(&mut *conn, line_id)
        .await?
        .ok_or_else(|| CoreError::SaleLineNotFound(line_id.to_string()))?;

    let previous = line.payment_status;

    if !previous.can_transition_to(next) {
        return Err(CoreError::InvalidStatusTransition {
            line_id: line_id.to_string(),
            from: previous,
            to: next,
        }
        .into());
    }

    let stock_restored = previous.restores_stock(next);
    if stock_restored {
        adjust_stock(
            &mut *conn,
            &line.product_id,
            line.quantity,
            LedgerDirection::Increase,
            MovementReason::Refund,
            Some(line_id),
        )
        .await?;
    }

    let notes = append_note(line.notes.as_deref(), note);
    let changed = previous != next || notes != line.notes;

    if changed {
        let now = Utc::now();
        update_status(&mut *conn, line_id, next, notes.as_deref(), now).await?;
        line.payment_status = next;
        line.notes = notes;
        line.updated_at = now;
    }

    Ok(StatusChange {
        line,
        previous_status: previous,
        stock_restored,
    })
}
