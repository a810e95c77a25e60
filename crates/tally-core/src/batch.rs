//! # Sale Batches
//!
//! A batch is every [`SaleLine`] sharing one batch key. It is never stored
//! as its own row: totals and status are folded from the lines each time a
//! batch is read.
//!
//! ## Batch Key Format
//! ```text
//! TX-20260315142233517-9f1c0e4b2d7a4c8e8b1f3a6d5e2c7b90
//! ── ───────────────── ────────────────────────────────
//!  │        │                        │
//!  │        │                        └── v4 UUID, simple hex (uniqueness)
//!  │        └── UTC timestamp, millisecond precision (sortability)
//!  └── prefix
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{PaymentMethod, PaymentStatus, SaleLine};

/// Prefix of every batch key.
pub const BATCH_KEY_PREFIX: &str = "TX-";

/// Generates a fresh batch key for a checkout.
///
/// ## Example
/// ```rust
/// use chrono::Utc;
/// use tally_core::batch::generate_batch_key;
///
/// let a = generate_batch_key(Utc::now());
/// let b = generate_batch_key(Utc::now());
/// assert!(a.starts_with("TX-"));
/// assert_ne!(a, b);
/// ```
pub fn generate_batch_key(now: DateTime<Utc>) -> String {
    format!(
        "{}{}-{}",
        BATCH_KEY_PREFIX,
        now.format("%Y%m%d%H%M%S%3f"),
        Uuid::new_v4().simple()
    )
}

/// One checkout, reconstructed from its lines.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleBatch {
    pub batch_key: String,
    /// Lines in insertion order.
    pub lines: Vec<SaleLine>,
    /// Σ line totals. Credit does not reduce it.
    pub total_cents: i64,
    /// Σ quantities.
    pub item_count: i64,
    pub line_count: usize,
    pub seller_id: Option<String>,
    pub customer_id: Option<String>,
    /// Customer name at read time, when the batch has a customer.
    pub customer_name: Option<String>,
    pub credit_applied_cents: i64,
    /// total_cents − credit_applied_cents.
    pub amount_due_cents: i64,
    /// Status of the first line.
    pub payment_status: PaymentStatus,
    pub payment_method: Option<PaymentMethod>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    /// Products whose stock fell to or below the minimum during this commit.
    /// Only populated on the batch returned by a checkout.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub low_stock: Vec<String>,
}

impl SaleBatch {
    /// Folds a batch's lines into a `SaleBatch`.
    ///
    /// Batch-level fields (seller, customer, method, status, timestamp) come
    /// from the first line. Credit is summed so it does not matter which
    /// line carries it.
    pub fn from_lines(
        batch_key: &str,
        lines: Vec<SaleLine>,
        customer_name: Option<String>,
    ) -> CoreResult<Self> {
        let first = lines
            .first()
            .ok_or_else(|| CoreError::BatchNotFound(batch_key.to_string()))?;

        let seller_id = first.seller_id.clone();
        let customer_id = first.customer_id.clone();
        let payment_status = first.payment_status;
        let payment_method = first.payment_method;
        let created_at = first.created_at;

        let total: Money = lines.iter().map(SaleLine::line_total).sum();
        let credit: Money = lines
            .iter()
            .map(|line| Money::from_cents(line.credit_applied_cents))
            .sum();
        let item_count = lines.iter().map(|line| line.quantity).sum();

        Ok(SaleBatch {
            batch_key: batch_key.to_string(),
            line_count: lines.len(),
            lines,
            total_cents: total.cents(),
            item_count,
            seller_id,
            customer_id,
            customer_name,
            credit_applied_cents: credit.cents(),
            amount_due_cents: (total - credit).cents(),
            payment_status,
            payment_method,
            created_at,
            low_stock: Vec::new(),
        })
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn credit_applied(&self) -> Money {
        Money::from_cents(self.credit_applied_cents)
    }

    #[inline]
    pub fn amount_due(&self) -> Money {
        Money::from_cents(self.amount_due_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
