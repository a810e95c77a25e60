//! # Domain Types
//!
//! Core domain types used throughout Tally POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    SaleLine     │   │    Customer     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  price_cents    │◄──│  product_id     │──►│  credit_balance │       │
//! │  │  stock          │   │  batch_key      │   │  _cents         │       │
//! │  │  min_stock      │   │  payment_status │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                              │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ PaymentStatus   │   │ PaymentMethod   │   │ LedgerDirection  │       │
//! │  │  PENDING        │   │  Cash           │   │  Increase       │       │
//! │  │  PAID           │   │  Card           │   │  Decrease       │       │
//! │  │  NOT_PAID       │   │  Transfer       │   └─────────────────┘       │
//! │  │  REFUNDED       │   │  Credit         │                              │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A sale batch is not a stored entity; see [`crate::batch::SaleBatch`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown to the seller and on receipts.
    pub name: String,

    /// Free-form category label.
    pub category: Option<String>,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    /// Unit sale price in cents.
    pub price_cents: i64,

    /// Unit cost in cents (for margin reporting).
    pub cost_cents: i64,

    /// Current stock level. Never negative.
    pub stock: i64,

    /// Low-stock threshold.
    pub min_stock: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// True when stock has fallen to or below the minimum threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.min_stock
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer holding a store-credit balance.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
    /// Store credit in cents. Never negative.
    pub credit_balance_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Returns the credit balance as Money.
    #[inline]
    pub fn credit_balance(&self) -> Money {
        Money::from_cents(self.credit_balance_cents)
    }
}

// =============================================================================
// Payment Status
// =============================================================================

/// Payment status of a single sale line.
///
/// ## State Machine
/// ```text
///   PENDING ──► PAID ──► REFUNDED
///      │         ▲ │
///      │         │ ▼
///      └────► NOT_PAID      (administrative correction)
/// ```
/// Setting a line to the status it already has is always allowed and
/// changes nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum PaymentStatus {
    /// Recorded but not yet settled.
    Pending,
    /// Settled. Initial status of every committed checkout.
    Paid,
    /// Marked unpaid by an administrator.
    NotPaid,
    /// Refunded; stock has been restored.
    Refunded,
}

impl PaymentStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [PaymentStatus; 4] = [
        PaymentStatus::Pending,
        PaymentStatus::Paid,
        PaymentStatus::NotPaid,
        PaymentStatus::Refunded,
    ];

    /// Returns the canonical upper-case name (also the stored value).
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Paid => "PAID",
            PaymentStatus::NotPaid => "NOT_PAID",
            PaymentStatus::Refunded => "REFUNDED",
        }
    }

    /// Checks whether a line in this status may move to `next`.
    pub fn can_transition_to(self, next: PaymentStatus) -> bool {
        use PaymentStatus::*;

        self == next
            || matches!(
                (self, next),
                (Pending, Paid) | (Pending, NotPaid) | (Paid, Refunded) | (Paid, NotPaid) | (NotPaid, Paid)
            )
    }

    /// True when moving to `next` must put the line's quantity back in stock.
    ///
    /// Only the first PAID → REFUNDED move restores stock; REFUNDED →
    /// REFUNDED is a no-op.
    pub fn restores_stock(self, next: PaymentStatus) -> bool {
        self != PaymentStatus::Refunded && next == PaymentStatus::Refunded
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Paid
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "paymentStatus".to_string(),
                allowed: PaymentStatus::ALL.iter().map(|s| s.as_str().to_string()).collect(),
            })
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Card payment on external terminal.
    Card,
    /// Bank transfer.
    Transfer,
    /// Paid (fully or partly) from store credit.
    Credit,
}

// =============================================================================
// Sale Line
// =============================================================================

/// One committed line item of a checkout.
///
/// Uses the snapshot pattern: unit price and product name are frozen at the
/// time of sale. Only `payment_status`, `notes` and `updated_at` ever change
/// after insertion.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleLine {
    pub id: String,
    /// Batch key shared by every line of the checkout.
    pub batch_key: String,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    /// Quantity sold. Always positive.
    pub quantity: i64,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    /// unit_price_cents × quantity.
    pub line_total_cents: i64,
    pub customer_id: Option<String>,
    pub seller_id: Option<String>,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<PaymentMethod>,
    /// Credit consumed by the checkout; carried on the batch's first line.
    pub credit_applied_cents: i64,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl SaleLine {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

/// Appends a note to existing notes, one note per line.
///
/// ## Example
/// ```rust
/// use tally_core::types::append_note;
///
/// assert_eq!(append_note(None, Some("refund: damaged")), Some("refund: damaged".to_string()));
/// assert_eq!(
///     append_note(Some("gift"), Some("refunded")),
///     Some("gift\nrefunded".to_string())
/// );
/// assert_eq!(append_note(Some("gift"), Some("  ")), Some("gift".to_string()));
/// ```
pub fn append_note(existing: Option<&str>, note: Option<&str>) -> Option<String> {
    let note = note.map(str::trim).filter(|n| !n.is_empty());

    match (existing, note) {
        (Some(existing), Some(note)) if !existing.is_empty() => Some(format!("{}\n{}", existing, note)),
        (_, Some(note)) => Some(note.to_string()),
        (existing, None) => existing.map(str::to_string),
    }
}

// =============================================================================
// Ledger Types
// =============================================================================

/// Direction of a ledger adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerDirection {
    Increase,
    Decrease,
}

impl LedgerDirection {
    /// Applies the direction to a positive delta.
    #[inline]
    pub const fn signed(&self, delta: i64) -> i64 {
        match self {
            LedgerDirection::Increase => delta,
            LedgerDirection::Decrease => -delta,
        }
    }
}

/// Why a ledger moved. Recorded on every movement row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum MovementReason {
    /// Checkout consumed stock or credit.
    Sale,
    /// Refund restored stock.
    Refund,
    /// Manual restock.
    Restock,
    /// Credit added to a customer account.
    TopUp,
}

// =============================================================================
// Unit Tests
// =============================================================================
