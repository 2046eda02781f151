//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - CRUD with a unique-name guarantee
//! - Partial updates (omitted fields keep their stored values)
//! - Atomic stock adjustment that can never drive quantity negative
//!
//! ## Stock Adjustment
//! ```text
//! adjust_quantity(id, -3)
//!      │
//!      ▼
//! UPDATE products SET quantity = quantity - 3
//! WHERE id = ? AND quantity - 3 >= 0
//!      │
//!      ├── 1 row  → StockChange { previous, current }
//!      └── 0 rows → InsufficientStock, stored value untouched
//! ```
//! The guard lives in the WHERE clause, so the check and the write are a
//! single statement rather than a read-modify-write pair.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use stockroom_core::{Money, Product, ProductPatch, StockChange};

const PRODUCT_COLUMNS: &str = "id, name, price_cents, quantity, category, created_at, updated_at";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
/// let product = repo.add("Mouse", Money::from_cents(2499), 50, Some("Accessories")).await?;
/// let found = repo.get_by_name("Mouse").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a new product.
    ///
    /// A duplicate-name pre-check fails fast with a readable error; the
    /// UNIQUE column constraint remains the authoritative signal if the
    /// pre-check is raced.
    ///
    /// ## Arguments
    /// * `name` - unique display name
    /// * `price` - unit price, non-negative
    /// * `quantity` - initial stock level, non-negative
    /// * `category` - optional free-text category
    ///
    /// ## Returns
    /// * `Ok(Product)` - the inserted row with its generated id
    /// * `Err(DbError::UniqueViolation)` - name already exists
    pub async fn add(
        &self,
        name: &str,
        price: Money,
        quantity: i64,
        category: Option<&str>,
    ) -> DbResult<Product> {
        debug!(name = %name, "Inserting product");

        if self.get_by_name(name).await?.is_some() {
            return Err(DbError::duplicate("products.name", name));
        }

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO products (name, price_cents, quantity, category, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(name)
        .bind(price.cents())
        .bind(quantity)
        .bind(category)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id.to_string()))
    }

    /// Lists all products, ordered by name.
    pub async fn list_all(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - product found
    /// * `Ok(None)` - product not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by its exact name.
    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE name = ?1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Applies a partial update to a product.
    ///
    /// Fetches the current row, overlays only the supplied fields and
    /// rewrites all columns; fields the caller omitted keep their prior
    /// values. `updated_at` is refreshed on every call.
    ///
    /// ## Returns
    /// * `Ok(Product)` - the row after the update
    /// * `Err(DbError::NotFound)` - product doesn't exist
    pub async fn update(&self, id: i64, patch: ProductPatch) -> DbResult<Product> {
        debug!(id = %id, "Updating product");

        let current = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id.to_string()))?;

        let name = patch.name.unwrap_or(current.name);
        let price_cents = patch.price.map(|p| p.cents()).unwrap_or(current.price_cents);
        let quantity = patch.quantity.unwrap_or(current.quantity);
        let category = patch.category.or(current.category);
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                price_cents = ?3,
                quantity = ?4,
                category = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&name)
        .bind(price_cents)
        .bind(quantity)
        .bind(&category)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id.to_string()));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id.to_string()))
    }

    /// Adjusts a product's stock level by `delta` (negative for sales,
    /// positive for restocking).
    ///
    /// The non-negative invariant is enforced in the WHERE clause, so a
    /// rejected adjustment leaves the stored quantity untouched.
    ///
    /// ## Returns
    /// * `Ok(StockChange)` - previous and current quantity, with the name
    /// * `Err(DbError::NotFound)` - product doesn't exist
    /// * `Err(DbError::InsufficientStock)` - delta would go below zero
    pub async fn adjust_quantity(&self, id: i64, delta: i64) -> DbResult<StockChange> {
        debug!(id = %id, delta = %delta, "Adjusting stock");

        let current = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id.to_string()))?;

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE products
            SET quantity = quantity + ?2, updated_at = ?3
            WHERE id = ?1 AND quantity + ?2 >= 0
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::InsufficientStock {
                product: current.name,
                available: current.quantity,
                requested: -delta,
            });
        }

        Ok(StockChange {
            product: current.name,
            previous: current.quantity,
            current: current.quantity + delta,
        })
    }

    /// Counts products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_add_then_lookup_by_name_and_id() {
        let db = test_db().await;
        let repo = db.products();

        let added = repo
            .add("Mouse", Money::from_cents(2499), 50, Some("Accessories"))
            .await
            .unwrap();

        let by_name = repo.get_by_name("Mouse").await.unwrap().unwrap();
        assert_eq!(by_name.price_cents, 2499);
        assert_eq!(by_name.quantity, 50);
        assert_eq!(by_name.category.as_deref(), Some("Accessories"));

        let by_id = repo.get_by_id(added.id).await.unwrap().unwrap();
        assert_eq!(by_id.id, by_name.id);
        assert_eq!(by_id.price_cents, by_name.price_cents);
        assert_eq!(by_id.quantity, by_name.quantity);
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let db = test_db().await;
        let repo = db.products();

        repo.add("Widget", Money::from_cents(999), 5, None)
            .await
            .unwrap();

        let err = repo
            .add("Widget", Money::from_cents(500), 1, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unique_constraint_is_authoritative() {
        // Bypass the pre-check by renaming into a taken name.
        let db = test_db().await;
        let repo = db.products();

        repo.add("Widget", Money::from_cents(999), 5, None)
            .await
            .unwrap();
        let other = repo
            .add("Gadget", Money::from_cents(1999), 2, None)
            .await
            .unwrap();

        let patch = ProductPatch {
            name: Some("Widget".to_string()),
            ..ProductPatch::default()
        };
        let err = repo.update(other.id, patch).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_list_all_ordered_by_name() {
        let db = test_db().await;
        let repo = db.products();

        repo.add("Monitor", Money::from_cents(29999), 15, None)
            .await
            .unwrap();
        repo.add("Keyboard", Money::from_cents(4999), 40, None)
            .await
            .unwrap();

        let names: Vec<String> = repo
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Keyboard", "Monitor"]);
    }

    #[tokio::test]
    async fn test_update_overlays_only_supplied_fields() {
        let db = test_db().await;
        let repo = db.products();

        let product = repo
            .add("Laptop", Money::from_cents(99999), 10, Some("Electronics"))
            .await
            .unwrap();

        let patch = ProductPatch {
            price: Some(Money::from_cents(89999)),
            ..ProductPatch::default()
        };
        let updated = repo.update(product.id, patch).await.unwrap();

        assert_eq!(updated.name, "Laptop");
        assert_eq!(updated.price_cents, 89999);
        assert_eq!(updated.quantity, 10);
        assert_eq!(updated.category.as_deref(), Some("Electronics"));
        assert!(updated.updated_at >= product.updated_at);
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let db = test_db().await;
        let repo = db.products();

        let err = repo.update(42, ProductPatch::default()).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_adjust_quantity_decrements_and_restocks() {
        let db = test_db().await;
        let repo = db.products();

        let product = repo
            .add("USB Drive", Money::from_cents(1999), 100, Some("Storage"))
            .await
            .unwrap();

        let change = repo.adjust_quantity(product.id, -30).await.unwrap();
        assert_eq!(change.previous, 100);
        assert_eq!(change.current, 70);

        let change = repo.adjust_quantity(product.id, 5).await.unwrap();
        assert_eq!(change.previous, 70);
        assert_eq!(change.current, 75);

        let stored = repo.get_by_id(product.id).await.unwrap().unwrap();
        assert_eq!(stored.quantity, 75);
    }

    #[tokio::test]
    async fn test_adjust_quantity_below_zero_rejected_and_unchanged() {
        let db = test_db().await;
        let repo = db.products();

        let product = repo
            .add("Widget", Money::from_cents(999), 5, None)
            .await
            .unwrap();

        let err = repo.adjust_quantity(product.id, -6).await.unwrap_err();
        match err {
            DbError::InsufficientStock {
                product,
                available,
                requested,
            } => {
                assert_eq!(product, "Widget");
                assert_eq!(available, 5);
                assert_eq!(requested, 6);
            }
            other => panic!("unexpected error: {other}"),
        }

        let stored = repo.get_by_id(product.id).await.unwrap().unwrap();
        assert_eq!(stored.quantity, 5);
    }

    #[tokio::test]
    async fn test_adjust_quantity_to_exactly_zero_is_allowed() {
        let db = test_db().await;
        let repo = db.products();

        let product = repo
            .add("Widget", Money::from_cents(999), 5, None)
            .await
            .unwrap();

        let change = repo.adjust_quantity(product.id, -5).await.unwrap();
        assert_eq!(change.current, 0);
    }
}
