//! # Wire Types
//!
//! Request bodies and response views. The engine works in integer cents;
//! everything here speaks decimals (`"6.00"`) and camelCase, which is what
//! the web UI expects.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_core::{
    CheckoutRequest, LineItem, Money, PaymentMethod, PaymentStatus, SaleBatch, SaleLine, ValidationError,
};
use tally_db::{SalesSummary, StatusChange, StatusCount};

// =============================================================================
// Requests
// =============================================================================

/// `POST /sales` body.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutBody {
    pub items: Vec<CheckoutItemBody>,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutItemBody {
    pub product_id: String,
    pub quantity: i64,
    pub unit_sale_price: Decimal,
}

impl CheckoutBody {
    /// Converts decimal prices to cents. Prices with more than two decimal
    /// places are rejected, naming the offending item.
    pub fn into_request(self) -> Result<CheckoutRequest, ValidationError> {
        let items = self
            .items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                let unit_price = Money::from_decimal(item.unit_sale_price).map_err(|err| match err {
                    ValidationError::InvalidFormat { reason, .. } => ValidationError::InvalidFormat {
                        field: format!("items[{}].unitSalePrice", index),
                        reason,
                    },
                    other => other,
                })?;
                Ok(LineItem::new(item.product_id, item.quantity, unit_price))
            })
            .collect::<Result<Vec<_>, ValidationError>>()?;

        Ok(CheckoutRequest {
            items,
            customer_id: self.customer_id,
            payment_method: self.payment_method,
            notes: self.notes,
        })
    }
}

/// `PATCH /sales/{lineId}/status` body.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBody {
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

/// `GET /sales/analytics` query string. Both bounds are RFC 3339.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyticsQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

// =============================================================================
// Responses
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleLineView {
    pub id: String,
    pub batch_key: String,
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_sale_price: Decimal,
    pub line_total: Decimal,
    pub customer_id: Option<String>,
    pub seller_id: Option<String>,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<PaymentMethod>,
    pub credit_applied: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SaleLine> for SaleLineView {
    fn from(line: SaleLine) -> Self {
        SaleLineView {
            unit_sale_price: line.unit_price().to_decimal(),
            line_total: line.line_total().to_decimal(),
            credit_applied: Money::from_cents(line.credit_applied_cents).to_decimal(),
            id: line.id,
            batch_key: line.batch_key,
            product_id: line.product_id,
            product_name: line.product_name,
            quantity: line.quantity,
            customer_id: line.customer_id,
            seller_id: line.seller_id,
            payment_status: line.payment_status,
            payment_method: line.payment_method,
            notes: line.notes,
            created_at: line.created_at,
            updated_at: line.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleBatchView {
    pub batch_key: String,
    pub lines: Vec<SaleLineView>,
    pub total: Decimal,
    pub item_count: i64,
    pub line_count: usize,
    pub seller_id: Option<String>,
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    pub credit_applied: Decimal,
    pub amount_due: Decimal,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<PaymentMethod>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub low_stock: Vec<String>,
}

impl From<SaleBatch> for SaleBatchView {
    fn from(batch: SaleBatch) -> Self {
        SaleBatchView {
            total: batch.total().to_decimal(),
            credit_applied: batch.credit_applied().to_decimal(),
            amount_due: batch.amount_due().to_decimal(),
            batch_key: batch.batch_key,
            lines: batch.lines.into_iter().map(SaleLineView::from).collect(),
            item_count: batch.item_count,
            line_count: batch.line_count,
            seller_id: batch.seller_id,
            customer_id: batch.customer_id,
            customer_name: batch.customer_name,
            payment_status: batch.payment_status,
            payment_method: batch.payment_method,
            created_at: batch.created_at,
            low_stock: batch.low_stock,
        }
    }
}

/// The updated line, flattened, plus what the change did.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeView {
    #[serde(flatten)]
    pub line: SaleLineView,
    pub previous_status: PaymentStatus,
    pub stock_restored: bool,
}

impl From<StatusChange> for StatusChangeView {
    fn from(change: StatusChange) -> Self {
        StatusChangeView {
            line: change.line.into(),
            previous_status: change.previous_status,
            stock_restored: change.stock_restored,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummaryView {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub line_count: i64,
    pub batch_count: i64,
    pub units_sold: i64,
    pub gross_revenue: Decimal,
    pub refunded: Decimal,
    pub credit_applied: Decimal,
    pub by_status: Vec<StatusCount>,
}

impl SalesSummaryView {
    pub fn new(query: AnalyticsQuery, summary: SalesSummary) -> Self {
        SalesSummaryView {
            from: query.from,
            to: query.to,
            line_count: summary.line_count,
            batch_count: summary.batch_count,
            units_sold: summary.units_sold,
            gross_revenue: Money::from_cents(summary.gross_revenue_cents).to_decimal(),
            refunded: Money::from_cents(summary.refunded_cents).to_decimal(),
            credit_applied: Money::from_cents(summary.credit_applied_cents).to_decimal(),
            by_status: summary.by_status,
        }
    }
}
