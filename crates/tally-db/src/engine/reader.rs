//! # Transaction Reader
//!
//! Rebuilds a committed checkout from its batch key, for receipts and
//! refund screens. Read-only: runs on the pool, never inside a write unit.
//! Under WAL a reader never sees a half-written batch, because lines only
//! become visible when the checkout's unit commits.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::customer::fetch_customer;
use crate::repository::sale::fetch_batch_lines;
use tally_core::{CoreError, SaleBatch};

#[derive(Debug, Clone)]
pub struct TransactionReader {
    pool: SqlitePool,
}

impl TransactionReader {
    pub fn new(pool: SqlitePool) -> Self {
        TransactionReader { pool }
    }

    /// Returns the full batch or `BatchNotFound` when no line carries the key.
    ///
    /// The batch status is the status of its first line; lines may have
    /// diverged through per-line status changes.
    pub async fn get_batch(&self, batch_key: &str) -> DbResult<SaleBatch> {
        debug!(batch_key = %batch_key, "Reading batch");

        let lines = fetch_batch_lines(&self.pool, batch_key).await?;
        if lines.is_empty() {
            return Err(CoreError::BatchNotFound(batch_key.to_string()).into());
        }

        let customer_name = match lines[0].customer_id.as_deref() {
            Some(customer_id) => fetch_customer(&self.pool, customer_id)
                .await?
                .map(|customer| customer.name),
            None => None,
        };

        Ok(SaleBatch::from_lines(batch_key, lines, customer_name)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{admin, customer, product, seller, test_db};
    use tally_core::{CheckoutRequest, LineItem, Money, PaymentStatus};

    #[tokio::test]
    async fn test_round_trip_through_reader() {
        let db = test_db().await;
        db.products().insert(&product("prod-a", 10, 200)).await.unwrap();
        db.products().insert(&product("prod-b", 10, 350)).await.unwrap();
        db.customers().insert(&customer("cust-1", 100)).await.unwrap();

        let request = CheckoutRequest {
            items: vec![
                LineItem::new("prod-b", 1, Money::from_cents(350)),
                LineItem::new("prod-a", 2, Money::from_cents(200)),
            ],
            customer_id: Some("cust-1".to_string()),
            ..Default::default()
        };
        let committed = db.coordinator().commit_checkout(&seller(), request).await.unwrap();

        let read = db.reader().get_batch(&committed.batch_key).await.unwrap();

        assert_eq!(read.line_count, 2);
        // Submission order is preserved.
        assert_eq!(read.lines[0].product_id, "prod-b");
        assert_eq!(read.lines[1].product_id, "prod-a");
        assert_eq!(read.total(), Money::from_cents(750));
        assert_eq!(read.credit_applied(), Money::from_cents(100));
        assert_eq!(read.customer_name.as_deref(), Some("Customer cust-1"));
        assert!(read.low_stock.is_empty());
    }

    #[tokio::test]
    async fn test_status_follows_first_line() {
        let db = test_db().await;
        db.products().insert(&product("prod-a", 10, 200)).await.unwrap();

        let request = CheckoutRequest {
            items: vec![
                LineItem::new("prod-a", 1, Money::from_cents(200)),
                LineItem::new("prod-a", 1, Money::from_cents(200)),
            ],
            ..Default::default()
        };
        let committed = db.coordinator().commit_checkout(&seller(), request).await.unwrap();

        db.status_processor()
            .update_status(&admin(), &committed.lines[1].id, PaymentStatus::Refunded, None)
            .await
            .unwrap();
        let read = db.reader().get_batch(&committed.batch_key).await.unwrap();
        assert_eq!(read.payment_status, PaymentStatus::Paid);

        db.status_processor()
            .update_status(&admin(), &committed.lines[0].id, PaymentStatus::NotPaid, None)
            .await
            .unwrap();
        let read = db.reader().get_batch(&committed.batch_key).await.unwrap();
        assert_eq!(read.payment_status, PaymentStatus::NotPaid);
    }

    #[tokio::test]
    async fn test_unknown_key() {
        let db = test_db().await;

        let err = db.reader().get_batch("TX-nope").await.unwrap_err();

        assert_eq!(err.as_domain(), Some(&CoreError::BatchNotFound("TX-nope".to_string())));
    }
}
