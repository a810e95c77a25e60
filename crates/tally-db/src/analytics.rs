//! # Sales Analytics
//!
//! Read-only aggregation over committed sale lines. It consumes what the
//! engine wrote and enforces nothing.
//!
//! ```text
//! sale_lines ──(created_at in [from, to))──► SalesSummary
//!                                            ├── line / batch counts
//!                                            ├── units sold (not refunded)
//!                                            ├── gross revenue (PAID lines)
//!                                            ├── refunded amount
//!                                            └── lines per status
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use tally_core::PaymentStatus;

/// Filter shared by both queries. Bound parameters: ?1 = from, ?2 = to.
const WINDOW: &str = r#"
    (?1 IS NULL OR julianday(created_at) >= julianday(?1))
    AND (?2 IS NULL OR julianday(created_at) < julianday(?2))
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: PaymentStatus,
    pub lines: i64,
}

/// Aggregates over a time window. Amounts are in cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub line_count: i64,
    pub batch_count: i64,
    /// Σ quantity over lines that are not REFUNDED.
    pub units_sold: i64,
    /// Σ line totals over PAID lines.
    pub gross_revenue_cents: i64,
    /// Σ line totals over REFUNDED lines.
    pub refunded_cents: i64,
    pub credit_applied_cents: i64,
    #[sqlx(skip)]
    pub by_status: Vec<StatusCount>,
}

#[derive(Debug, Clone)]
pub struct SalesAnalytics {
    pool: SqlitePool,
}

impl SalesAnalytics {
    pub fn new(pool: SqlitePool) -> Self {
        SalesAnalytics { pool }
    }

    /// Summarizes lines created in `[from, to)`. Either bound may be open.
    pub async fn summary(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> DbResult<SalesSummary> {
        debug!(?from, ?to, "Computing sales summary");

        let sql = format!(
            r#"
            SELECT
                COUNT(*) AS line_count,
                COUNT(DISTINCT batch_key) AS batch_count,
                COALESCE(SUM(CASE WHEN payment_status <> 'REFUNDED' THEN quantity ELSE 0 END), 0) AS units_sold,
                COALESCE(SUM(CASE WHEN payment_status = 'PAID' THEN line_total_cents ELSE 0 END), 0) AS gross_revenue_cents,
                COALESCE(SUM(CASE WHEN payment_status = 'REFUNDED' THEN line_total_cents ELSE 0 END), 0) AS refunded_cents,
                COALESCE(SUM(credit_applied_cents), 0) AS credit_applied_cents
            FROM sale_lines
            WHERE {}
            "#,
            WINDOW
        );

        let mut summary = sqlx::query_as::<_, SalesSummary>(&sql)
            .bind(from)
            .bind(to)
            .fetch_one(&self.pool)
            .await?;

        let sql = format!(
            "SELECT payment_status, COUNT(*) FROM sale_lines WHERE {} GROUP BY payment_status",
            WINDOW
        );

        let counts: Vec<(PaymentStatus, i64)> = sqlx::query_as(&sql)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;

        summary.by_status = PaymentStatus::ALL
            .into_iter()
            .map(|status| StatusCount {
                status,
                lines: counts
                    .iter()
                    .find(|(s, _)| *s == status)
                    .map(|(_, n)| *n)
                    .unwrap_or(0),
            })
            .collect();

        Ok(summary)
    }
}
