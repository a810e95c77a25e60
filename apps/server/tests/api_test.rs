//! HTTP tests for the REST API.
//!
//! Each test starts the real router on an ephemeral port over a temp-file
//! database and drives it with `reqwest`, checking the envelope, status
//! codes and the stored state behind them.

use chrono::{Duration, Utc};
use futures::future::join_all;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tally_core::{Customer, Product, Role};
use tally_db::{Database, DbConfig};
use tally_server::{build_router, AppState, JwtManager};
use tempfile::TempDir;
use tokio::net::TcpListener;

// === Test server ===

struct TestServer {
    base: String,
    client: Client,
    db: Database,
    jwt: JwtManager,
    _dir: TempDir,
}

impl TestServer {
    async fn start() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("api.db")).max_connections(4))
            .await
            .unwrap();
        let jwt = JwtManager::new("api-test-secret");

        let app = build_router(AppState::new(db.clone(), jwt.clone()));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        TestServer {
            base: format!("http://{}", addr),
            client: Client::new(),
            db,
            jwt,
            _dir: dir,
        }
    }

    fn token(&self, role: Role) -> String {
        let user = format!("{}-1", role);
        self.jwt.issue_token(&user, role, Duration::hours(1)).unwrap()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn checkout(&self, role: Role, body: Value) -> (StatusCode, Value) {
        let res = self
            .client
            .post(self.url("/sales"))
            .bearer_auth(self.token(role))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap())
    }

    async fn set_status(&self, role: Role, line_id: &str, body: Value) -> (StatusCode, Value) {
        let res = self
            .client
            .patch(self.url(&format!("/sales/{}/status", line_id)))
            .bearer_auth(self.token(role))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap())
    }

    async fn add_product(&self, id: &str, stock: i64, price_cents: i64) {
        let now = Utc::now();
        self.db
            .products()
            .insert(&Product {
                id: id.to_string(),
                name: format!("Product {}", id),
                category: None,
                is_active: true,
                price_cents,
                cost_cents: price_cents / 2,
                stock,
                min_stock: 1,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
    }

    async fn add_customer(&self, id: &str, credit_cents: i64) {
        let now = Utc::now();
        self.db
            .customers()
            .insert(&Customer {
                id: id.to_string(),
                name: format!("Customer {}", id),
                credit_balance_cents: credit_cents,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
    }

    async fn stock(&self, id: &str) -> i64 {
        self.db.products().get_by_id(id).await.unwrap().unwrap().stock
    }
}

fn item(product_id: &str, quantity: i64, price: &str) -> Value {
    json!({ "productId": product_id, "quantity": quantity, "unitSalePrice": price })
}

// === Tests ===

#[tokio::test]
async fn test_health() {
    let server = TestServer::start().await;

    let res = server.client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["database"], true);
}

#[tokio::test]
async fn test_checkout_and_receipt() {
    let server = TestServer::start().await;
    server.add_product("A", 5, 200).await;

    let (status, body) = server
        .checkout(Role::Seller, json!({ "items": [item("A", 3, "2.00")], "paymentMethod": "cash" }))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    let batch = &body["data"];
    assert_eq!(batch["total"], "6.00");
    assert_eq!(batch["amountDue"], "6.00");
    assert_eq!(batch["itemCount"], 3);
    assert_eq!(batch["lineCount"], 1);
    assert_eq!(batch["paymentStatus"], "PAID");
    assert_eq!(batch["sellerId"], "seller-1");
    assert_eq!(batch["lines"][0]["unitSalePrice"], "2.00");
    assert_eq!(server.stock("A").await, 2);

    let key = batch["batchKey"].as_str().unwrap();
    assert!(key.starts_with("TX-"));

    // Any authenticated role may read a receipt
    let res = server
        .client
        .get(server.url(&format!("/sales/transaction/{}", key)))
        .bearer_auth(server.token(Role::Viewer))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let receipt: Value = res.json().await.unwrap();
    assert_eq!(receipt["data"]["batchKey"], key);
    assert_eq!(receipt["data"]["total"], "6.00");
    assert_eq!(receipt["data"]["lines"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_insufficient_stock_is_bad_request_and_changes_nothing() {
    let server = TestServer::start().await;
    server.add_product("B", 1, 100).await;

    let (status, body) = server
        .checkout(Role::Seller, json!({ "items": [item("B", 1, "1.00"), item("B", 1, "1.00")] }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "INSUFFICIENT_STOCK");
    assert!(body["error"].as_str().unwrap().contains("B"));
    assert!(body.get("data").is_none());
    assert_eq!(server.stock("B").await, 1);
    assert_eq!(server.db.sales().count_lines().await.unwrap(), 0);
}

#[tokio::test]
async fn test_credit_is_capped_at_total() {
    let server = TestServer::start().await;
    server.add_product("C", 10, 500).await;
    server.add_customer("cust-1", 1000).await;

    let (status, body) = server
        .checkout(
            Role::Seller,
            json!({ "items": [item("C", 3, "5.00")], "customerId": "cust-1", "paymentMethod": "credit" }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["total"], "15.00");
    assert_eq!(body["data"]["creditApplied"], "10.00");
    assert_eq!(body["data"]["amountDue"], "5.00");
    assert_eq!(body["data"]["customerName"], "Customer cust-1");

    let customer = server.db.customers().get_by_id("cust-1").await.unwrap().unwrap();
    assert_eq!(customer.credit_balance_cents, 0);
}

#[tokio::test]
async fn test_unknown_product_and_customer_are_not_found() {
    let server = TestServer::start().await;
    server.add_product("A", 5, 200).await;

    let (status, body) = server
        .checkout(Role::Seller, json!({ "items": [item("missing", 1, "1.00")] }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, _) = server
        .checkout(Role::Seller, json!({ "items": [item("A", 1, "2.00")], "customerId": "ghost" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(server.stock("A").await, 5);
}

#[tokio::test]
async fn test_bad_input_is_validation_error() {
    let server = TestServer::start().await;
    server.add_product("A", 5, 200).await;

    let (status, body) = server.checkout(Role::Seller, json!({ "items": [] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = server
        .checkout(Role::Seller, json!({ "items": [item("A", 1, "2.005")] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("unitSalePrice"));

    let (status, _) = server
        .checkout(Role::Seller, json!({ "items": [item("A", 0, "2.00")] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Not JSON at all
    let res = server
        .client
        .post(server.url("/sales"))
        .bearer_auth(server.token(Role::Seller))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["code"], "VALIDATION_ERROR");

    assert_eq!(server.stock("A").await, 5);
}

#[tokio::test]
async fn test_unit_price_is_capped() {
    let server = TestServer::start().await;
    server.add_product("A", 5, 200).await;

    let (status, body) = server
        .checkout(Role::Seller, json!({ "items": [item("A", 2, "92233720368547758.00")] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["error"].as_str().unwrap().contains("unitSalePrice"));

    let (status, _) = server
        .checkout(Role::Seller, json!({ "items": [item("A", 2, "1000000.00")] }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let res = server
        .client
        .get(server.url("/sales/analytics"))
        .bearer_auth(server.token(Role::Admin))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let summary: Value = res.json().await.unwrap();
    assert_eq!(summary["data"]["grossRevenue"], "2000000.00");
    assert_eq!(server.stock("A").await, 3);
}

#[tokio::test]
async fn test_authentication_and_roles() {
    let server = TestServer::start().await;
    server.add_product("A", 5, 200).await;
    let body = json!({ "items": [item("A", 1, "2.00")] });

    let res = server.client.post(server.url("/sales")).json(&body).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let envelope: Value = res.json().await.unwrap();
    assert_eq!(envelope["code"], "UNAUTHORIZED");

    let res = server
        .client
        .post(server.url("/sales"))
        .bearer_auth("not-a-jwt")
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let (status, envelope) = server.checkout(Role::Viewer, body.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(envelope["code"], "FORBIDDEN");

    let (status, _) = server.checkout(Role::Admin, body).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(server.stock("A").await, 4);
}

#[tokio::test]
async fn test_refund_restores_stock_once() {
    let server = TestServer::start().await;
    server.add_product("A", 5, 200).await;

    let (_, body) = server
        .checkout(Role::Seller, json!({ "items": [item("A", 2, "2.00")] }))
        .await;
    let line_id = body["data"]["lines"][0]["id"].as_str().unwrap().to_string();
    assert_eq!(server.stock("A").await, 3);

    // Sellers cannot change status
    let (status, _) = server
        .set_status(Role::Seller, &line_id, json!({ "paymentStatus": "REFUNDED" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = server
        .set_status(Role::Admin, &line_id, json!({ "paymentStatus": "REFUNDED", "notes": "damaged" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["paymentStatus"], "REFUNDED");
    assert_eq!(body["data"]["previousStatus"], "PAID");
    assert_eq!(body["data"]["stockRestored"], true);
    assert_eq!(body["data"]["notes"], "damaged");
    assert_eq!(server.stock("A").await, 5);

    let (status, body) = server
        .set_status(Role::Admin, &line_id, json!({ "paymentStatus": "REFUNDED" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["stockRestored"], false);
    assert_eq!(server.stock("A").await, 5);

    let (status, body) = server
        .set_status(Role::Admin, &line_id, json!({ "paymentStatus": "PAID" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INVALID_STATUS_TRANSITION");

    let (status, _) = server
        .set_status(Role::Admin, "no-such-line", json!({ "paymentStatus": "PAID" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_batch_is_not_found() {
    let server = TestServer::start().await;

    let res = server
        .client
        .get(server.url("/sales/transaction/TX-20260101000000000-deadbeef"))
        .bearer_auth(server.token(Role::Seller))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_batch_key_is_opaque() {
    let server = TestServer::start().await;

    for key in ["batch-0001", "tx-lowercase", "12345"] {
        let res = server
            .client
            .get(server.url(&format!("/sales/transaction/{}", key)))
            .bearer_auth(server.token(Role::Seller))
            .send()
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::NOT_FOUND, "key {}", key);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["code"], "NOT_FOUND");
    }

    let res = server
        .client
        .get(server.url(&format!("/sales/transaction/{}", "k".repeat(65))))
        .bearer_auth(server.token(Role::Seller))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analytics_requires_admin() {
    let server = TestServer::start().await;
    server.add_product("A", 10, 200).await;

    let (_, body) = server
        .checkout(Role::Seller, json!({ "items": [item("A", 2, "2.00"), item("A", 1, "3.00")] }))
        .await;
    let refunded = body["data"]["lines"][1]["id"].as_str().unwrap().to_string();
    server
        .set_status(Role::Admin, &refunded, json!({ "paymentStatus": "REFUNDED" }))
        .await;

    let res = server
        .client
        .get(server.url("/sales/analytics"))
        .bearer_auth(server.token(Role::Seller))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server
        .client
        .get(server.url("/sales/analytics"))
        .bearer_auth(server.token(Role::Admin))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let summary: Value = res.json().await.unwrap();
    let data = &summary["data"];
    assert_eq!(data["lineCount"], 2);
    assert_eq!(data["batchCount"], 1);
    assert_eq!(data["unitsSold"], 2);
    assert_eq!(data["grossRevenue"], "4.00");
    assert_eq!(data["refunded"], "3.00");
    assert_eq!(data["byStatus"].as_array().unwrap().len(), 4);

    let res = server
        .client
        .get(server.url("/sales/analytics?from=yesterday"))
        .bearer_auth(server.token(Role::Admin))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_checkouts_for_last_unit() {
    let server = TestServer::start().await;
    server.add_product("D", 1, 100).await;

    let body = json!({ "items": [item("D", 1, "1.00")] });
    let results = join_all((0..2).map(|_| server.checkout(Role::Seller, body.clone()))).await;

    let created = results.iter().filter(|(s, _)| *s == StatusCode::CREATED).count();
    let rejected: Vec<_> = results
        .iter()
        .filter(|(s, _)| *s == StatusCode::BAD_REQUEST)
        .collect();

    assert_eq!(created, 1);
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].1["code"], "INSUFFICIENT_STOCK");
    assert_eq!(server.stock("D").await, 0);
}

#[tokio::test]
async fn test_unknown_route_uses_envelope() {
    let server = TestServer::start().await;

    let res = server.client.get(server.url("/nope")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "NOT_FOUND");
}
