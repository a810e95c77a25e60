//! # Product Repository
//!
//! Catalog reads and writes for products.
//!
//! Stock is not written here: every stock change goes through
//! [`crate::ledger::inventory::adjust_stock`] so the floor at zero has a
//! single enforcement point. [`ProductRepository::restock`] is a thin
//! wrapper that opens its own write unit around the ledger.

use chrono::Utc;
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::engine::unit::WriteUnit;
use crate::error::{DbError, DbResult};
use crate::ledger::inventory::adjust_stock;
use tally_core::validation::{validate_delta, validate_id};
use tally_core::{LedgerDirection, MovementReason, Product};

const PRODUCT_COLUMNS: &str = r#"
    id, name, category, is_active, price_cents, cost_cents,
    stock, min_stock, created_at, updated_at
"#;

/// Fetches a product by id on any executor (pool or open write unit).
pub(crate) async fn fetch_product<'e, E>(executor: E, id: &str) -> DbResult<Option<Product>>
where
    E: SqliteExecutor<'e>,
{
    let sql = format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLUMNS);

    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(product)
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by ID, active or not.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        fetch_product(&self.pool, id).await
    }

    /// Lists active products at or below their minimum stock.
    pub async fn list_low_stock(&self) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE is_active = 1 AND stock <= min_stock ORDER BY name",
            PRODUCT_COLUMNS
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// The product as given. A duplicate id surfaces as
    /// [`DbError::UniqueViolation`].
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        validate_id("productId", &product.id)?;

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, category, is_active, price_cents, cost_cents,
                stock, min_stock, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.is_active)
        .bind(product.price_cents)
        .bind(product.cost_cents)
        .bind(product.stock)
        .bind(product.min_stock)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product.clone())
    }

    /// Adds stock through the inventory ledger, returning the new level.
    pub async fn restock(&self, id: &str, quantity: i64) -> DbResult<i64> {
        validate_delta("quantity", quantity)?;

        let mut unit = WriteUnit::begin(&self.pool).await?;
        let result = adjust_stock(
            unit.conn(),
            id,
            quantity,
            LedgerDirection::Increase,
            MovementReason::Restock,
            None,
        )
        .await;

        unit.finish(result).await
    }

    /// Soft-deletes a product by setting is_active = false.
    ///
    /// ## Why Soft Delete?
    /// Historical sale lines still reference this product.
    pub async fn deactivate(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deactivating product");

        let result = sqlx::query("UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1")
            .bind(id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts active products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{product, test_db};

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert(&product("prod-a", 5, 200)).await.unwrap();

        let fetched = repo.get_by_id("prod-a").await.unwrap().unwrap();
        assert_eq!(fetched.stock, 5);
        assert_eq!(fetched.price_cents, 200);
        assert!(fetched.is_active);

        assert!(repo.get_by_id("missing").await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_unique_violation() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert(&product("prod-a", 5, 200)).await.unwrap();
        let err = repo.insert(&product("prod-a", 1, 100)).await.unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_restock_and_deactivate() {
        let db = test_db().await;
        let repo = db.products();
        repo.insert(&product("prod-a", 1, 200)).await.unwrap();

        assert_eq!(repo.restock("prod-a", 4).await.unwrap(), 5);

        repo.deactivate("prod-a").await.unwrap();
        assert!(!repo.get_by_id("prod-a").await.unwrap().unwrap().is_active);
        assert!(matches!(
            repo.deactivate("missing").await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_low_stock() {
        let db = test_db().await;
        let repo = db.products();

        let mut low = product("prod-low", 2, 100);
        low.min_stock = 2;
        repo.insert(&low).await.unwrap();
        repo.insert(&product("prod-ok", 50, 100)).await.unwrap();

        let listed = repo.list_low_stock().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "prod-low");
    }
}
