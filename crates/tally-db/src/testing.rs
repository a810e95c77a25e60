//! Fixtures shared by the unit tests of this crate.

use chrono::Utc;

use crate::{Database, DbConfig};
use tally_core::{Capability, Customer, Product, Role};

pub(crate) async fn test_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

/// Active product with `min_stock` 0.
pub(crate) fn product(id: &str, stock: i64, price_cents: i64) -> Product {
    let now = Utc::now();
    Product {
        id: id.to_string(),
        name: format!("Product {}", id),
        category: None,
        is_active: true,
        price_cents,
        cost_cents: price_cents / 2,
        stock,
        min_stock: 0,
        created_at: now,
        updated_at: now,
    }
}

pub(crate) fn customer(id: &str, credit_balance_cents: i64) -> Customer {
    let now = Utc::now();
    Customer {
        id: id.to_string(),
        name: format!("Customer {}", id),
        credit_balance_cents,
        created_at: now,
        updated_at: now,
    }
}

pub(crate) fn seller() -> Capability {
    Capability::new("seller-1", Role::Seller)
}

pub(crate) fn admin() -> Capability {
    Capability::new("admin-1", Role::Admin)
}
