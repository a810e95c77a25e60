//! Integration tests for the sale-transaction engine.
//!
//! Each test drives the public `Database` API the way the server does and
//! checks the invariants on stored state afterwards: stock and credit never
//! negative, batches all-or-nothing, refunds restoring stock exactly once.

use chrono::Utc;
use futures::future::join_all;
use std::time::Duration;
use tally_core::{
    Capability, CheckoutRequest, CoreError, Customer, LineItem, Money, PaymentStatus, Product, Role,
};
use tally_db::{Database, DbConfig, DbError};
use tempfile::TempDir;

// === Fixtures ===

fn seller() -> Capability {
    Capability::new("seller-1", Role::Seller)
}

fn admin() -> Capability {
    Capability::new("admin-1", Role::Admin)
}

fn product(id: &str, stock: i64, price_cents: i64) -> Product {
    let now = Utc::now();
    Product {
        id: id.to_string(),
        name: format!("Product {}", id),
        category: Some("test".to_string()),
        is_active: true,
        price_cents,
        cost_cents: price_cents / 2,
        stock,
        min_stock: 0,
        created_at: now,
        updated_at: now,
    }
}

fn customer(id: &str, credit_balance_cents: i64) -> Customer {
    let now = Utc::now();
    Customer {
        id: id.to_string(),
        name: format!("Customer {}", id),
        credit_balance_cents,
        created_at: now,
        updated_at: now,
    }
}

fn cart(items: Vec<LineItem>) -> CheckoutRequest {
    CheckoutRequest {
        items,
        ..Default::default()
    }
}

async fn memory_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

/// File-backed database with several connections, so writers really race.
async fn file_db() -> (TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let config = DbConfig::new(dir.path().join("tally.db"))
        .max_connections(8)
        .busy_timeout(Duration::from_secs(10));
    let db = Database::new(config).await.unwrap();
    (dir, db)
}

async fn stock(db: &Database, id: &str) -> i64 {
    db.products().get_by_id(id).await.unwrap().unwrap().stock
}

async fn credit(db: &Database, id: &str) -> i64 {
    db.customers().get_by_id(id).await.unwrap().unwrap().credit_balance_cents
}

// === Commit ===

#[tokio::test]
async fn single_line_commit_decrements_stock() {
    let db = memory_db().await;
    db.products().insert(&product("A", 5, 200)).await.unwrap();

    let batch = db
        .coordinator()
        .commit_checkout(&seller(), cart(vec![LineItem::new("A", 3, Money::from_cents(200))]))
        .await
        .unwrap();

    assert_eq!(stock(&db, "A").await, 2);
    assert_eq!(batch.total(), Money::from_cents(600));
    assert_eq!(batch.payment_status, PaymentStatus::Paid);
}

#[tokio::test]
async fn n_lines_share_one_batch_key_and_sum_to_total() {
    let db = memory_db().await;
    db.products().insert(&product("A", 10, 200)).await.unwrap();
    db.products().insert(&product("B", 10, 125)).await.unwrap();
    db.products().insert(&product("C", 10, 999)).await.unwrap();

    let items = vec![
        LineItem::new("A", 2, Money::from_cents(200)),
        LineItem::new("B", 4, Money::from_cents(125)),
        LineItem::new("C", 1, Money::from_cents(999)),
        LineItem::new("A", 1, Money::from_cents(180)),
    ];
    let expected: i64 = items.iter().map(|i| i.quantity * i.unit_price.cents()).sum();

    let batch = db.coordinator().commit_checkout(&seller(), cart(items)).await.unwrap();

    let stored = db.sales().lines_for_batch(&batch.batch_key).await.unwrap();
    assert_eq!(stored.len(), 4);
    assert!(stored.iter().all(|l| l.batch_key == batch.batch_key));
    assert!(stored.iter().all(|l| l.line_total_cents == l.quantity * l.unit_price_cents));
    assert_eq!(batch.total_cents, expected);
    assert_eq!(batch.item_count, 8);
    assert_eq!(stock(&db, "A").await, 7);
}

#[tokio::test]
async fn batch_keys_are_unique() {
    let db = memory_db().await;
    db.products().insert(&product("A", 100, 200)).await.unwrap();

    let mut keys = Vec::new();
    for _ in 0..20 {
        let batch = db
            .coordinator()
            .commit_checkout(&seller(), cart(vec![LineItem::new("A", 1, Money::from_cents(200))]))
            .await
            .unwrap();
        keys.push(batch.batch_key);
    }

    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), 20);
}

// === All-or-nothing ===

#[tokio::test]
async fn same_product_twice_sees_in_batch_decrement() {
    let db = memory_db().await;
    db.products().insert(&product("B", 1, 200)).await.unwrap();

    let err = db
        .coordinator()
        .commit_checkout(
            &seller(),
            cart(vec![
                LineItem::new("B", 1, Money::from_cents(200)),
                LineItem::new("B", 1, Money::from_cents(200)),
            ]),
        )
        .await
        .unwrap_err();

    assert_eq!(
        err.as_domain(),
        Some(&CoreError::InsufficientStock {
            product_id: "B".to_string(),
            available: 0,
            requested: 1,
        })
    );
    assert_eq!(stock(&db, "B").await, 1);
    assert_eq!(db.sales().count_lines().await.unwrap(), 0);
}

#[tokio::test]
async fn invalid_last_line_rolls_back_predecessors() {
    let db = memory_db().await;
    db.products().insert(&product("A", 5, 200)).await.unwrap();
    db.products().insert(&product("B", 5, 300)).await.unwrap();
    db.customers().insert(&customer("C", 10_000)).await.unwrap();

    let request = CheckoutRequest {
        items: vec![
            LineItem::new("A", 2, Money::from_cents(200)),
            LineItem::new("B", 1, Money::from_cents(300)),
            LineItem::new("missing", 1, Money::from_cents(100)),
        ],
        customer_id: Some("C".to_string()),
        ..Default::default()
    };
    let err = db.coordinator().commit_checkout(&seller(), request).await.unwrap_err();

    assert_eq!(err.as_domain(), Some(&CoreError::ProductNotFound("missing".to_string())));
    assert_eq!(stock(&db, "A").await, 5);
    assert_eq!(stock(&db, "B").await, 5);
    assert_eq!(credit(&db, "C").await, 10_000);
    assert_eq!(db.sales().count_lines().await.unwrap(), 0);

    let movements: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stock_movements")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(movements, 0);
}

#[tokio::test]
async fn bad_quantity_is_a_validation_error() {
    let db = memory_db().await;
    db.products().insert(&product("A", 5, 200)).await.unwrap();

    let err = db
        .coordinator()
        .commit_checkout(&seller(), cart(vec![LineItem::new("A", 0, Money::from_cents(200))]))
        .await
        .unwrap_err();

    assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
    assert_eq!(stock(&db, "A").await, 5);
}

// === Credit ===

#[tokio::test]
async fn credit_is_capped_at_balance() {
    let db = memory_db().await;
    db.products().insert(&product("A", 10, 500)).await.unwrap();
    db.customers().insert(&customer("C", 1000)).await.unwrap();

    let request = CheckoutRequest {
        items: vec![LineItem::new("A", 3, Money::from_cents(500))],
        customer_id: Some("C".to_string()),
        ..Default::default()
    };
    let batch = db.coordinator().commit_checkout(&seller(), request).await.unwrap();

    assert_eq!(batch.credit_applied(), Money::from_cents(1000));
    assert_eq!(batch.total(), Money::from_cents(1500));
    assert_eq!(batch.amount_due(), Money::from_cents(500));
    assert_eq!(credit(&db, "C").await, 0);

    let read = db.reader().get_batch(&batch.batch_key).await.unwrap();
    assert_eq!(read.credit_applied(), Money::from_cents(1000));
    assert_eq!(read.total(), Money::from_cents(1500));
}

#[tokio::test]
async fn zero_credit_customer_buys_without_credit_movement() {
    let db = memory_db().await;
    db.products().insert(&product("A", 10, 500)).await.unwrap();
    db.customers().insert(&customer("C", 0)).await.unwrap();

    let request = CheckoutRequest {
        items: vec![LineItem::new("A", 1, Money::from_cents(500))],
        customer_id: Some("C".to_string()),
        ..Default::default()
    };
    let batch = db.coordinator().commit_checkout(&seller(), request).await.unwrap();

    assert_eq!(batch.credit_applied(), Money::zero());
    let movements: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM credit_movements")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(movements, 0);
}

// === Refunds ===

#[tokio::test]
async fn refund_restores_exact_quantity_once() {
    let db = memory_db().await;
    db.products().insert(&product("A", 10, 200)).await.unwrap();

    let batch = db
        .coordinator()
        .commit_checkout(&seller(), cart(vec![LineItem::new("A", 7, Money::from_cents(200))]))
        .await
        .unwrap();
    let line_id = batch.lines[0].id.clone();
    assert_eq!(stock(&db, "A").await, 3);

    for _ in 0..3 {
        db.status_processor()
            .update_status(&admin(), &line_id, PaymentStatus::Refunded, None)
            .await
            .unwrap();
    }

    assert_eq!(stock(&db, "A").await, 10);
}

// === Concurrency ===

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_checkouts_for_last_unit() {
    let (_dir, db) = file_db().await;
    db.products().insert(&product("D", 1, 200)).await.unwrap();

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let db = db.clone();
            tokio::spawn(async move {
                db.coordinator()
                    .commit_checkout(&seller(), cart(vec![LineItem::new("D", 1, Money::from_cents(200))]))
                    .await
            })
        })
        .collect();

    let results: Vec<_> = join_all(handles).await.into_iter().map(|r| r.unwrap()).collect();

    let committed = results.iter().filter(|r| r.is_ok()).count();
    let rejected: Vec<_> = results.iter().filter_map(|r| r.as_ref().err()).collect();

    assert_eq!(committed, 1);
    assert_eq!(rejected.len(), 1);
    assert!(matches!(
        rejected[0].as_domain(),
        Some(CoreError::InsufficientStock { available: 0, .. })
    ));
    assert_eq!(stock(&db, "D").await, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn many_concurrent_checkouts_never_oversell() {
    let (_dir, db) = file_db().await;
    db.products().insert(&product("E", 25, 100)).await.unwrap();
    db.customers().insert(&customer("C", 3000)).await.unwrap();

    let handles: Vec<_> = (0..40)
        .map(|i| {
            let db = db.clone();
            tokio::spawn(async move {
                let request = CheckoutRequest {
                    items: vec![LineItem::new("E", 1 + (i % 2), Money::from_cents(100))],
                    customer_id: Some("C".to_string()),
                    ..Default::default()
                };
                db.coordinator().commit_checkout(&seller(), request).await
            })
        })
        .collect();

    let results: Vec<_> = join_all(handles).await.into_iter().map(|r| r.unwrap()).collect();

    let sold: i64 = results
        .iter()
        .filter_map(|r| r.as_ref().ok())
        .map(|batch| batch.item_count)
        .sum();
    let credit_used: i64 = results
        .iter()
        .filter_map(|r| r.as_ref().ok())
        .map(|batch| batch.credit_applied_cents)
        .sum();

    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert!(matches!(err.as_domain(), Some(CoreError::InsufficientStock { .. })));
    }

    let remaining = stock(&db, "E").await;
    assert!(remaining >= 0);
    assert_eq!(remaining + sold, 25);

    let balance = credit(&db, "C").await;
    assert!(balance >= 0);
    assert_eq!(balance + credit_used, 3000);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_refunds_restore_once() {
    let (_dir, db) = file_db().await;
    db.products().insert(&product("F", 5, 100)).await.unwrap();

    let batch = db
        .coordinator()
        .commit_checkout(&seller(), cart(vec![LineItem::new("F", 5, Money::from_cents(100))]))
        .await
        .unwrap();
    let line_id = batch.lines[0].id.clone();

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let db = db.clone();
            let line_id = line_id.clone();
            tokio::spawn(async move {
                db.status_processor()
                    .update_status(&admin(), &line_id, PaymentStatus::Refunded, None)
                    .await
            })
        })
        .collect();

    let changes: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|r| r.unwrap().unwrap())
        .collect();

    assert_eq!(changes.iter().filter(|c| c.stock_restored).count(), 1);
    assert_eq!(stock(&db, "F").await, 5);
}
