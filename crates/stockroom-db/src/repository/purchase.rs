//! # Purchase Repository
//!
//! Transactional purchase creation and purchase history.
//!
//! ## Purchase Creation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   create(customer_id, lines)                            │
//! │                                                                         │
//! │  BEGIN TRANSACTION                                                      │
//! │    1. For every line: load product, check stock, snapshot price         │
//! │       └── any missing product or short stock → whole purchase fails     │
//! │    2. INSERT purchases header, read back generated id                   │
//! │    3. For every line:                                                   │
//! │       ├── INSERT purchase_items (with price snapshot)                   │
//! │       └── UPDATE products stock, guarded against going negative         │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any error before COMMIT rolls everything back: no header without       │
//! │  items, no decrement without a line, no partial purchase ever.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The guarded UPDATE in step 3 matters even though step 1 validated each
//! line: a purchase may list the same product twice, and only the guard
//! sees the combined deduction.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use stockroom_core::{
    Money, OrderLine, Product, PurchaseItemDetail, PurchaseLine, PurchaseReceipt, PurchaseSummary,
};

const SUMMARY_QUERY: &str = r#"
    SELECT p.id, p.customer_id, c.name AS customer_name, p.total_cents, p.purchase_date
    FROM purchases p
    LEFT JOIN customers c ON p.customer_id = c.id
"#;

/// Repository for purchase database operations.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

impl PurchaseRepository {
    /// Creates a new PurchaseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseRepository { pool }
    }

    /// Creates a purchase atomically with its line items and stock
    /// decrements.
    ///
    /// ## Arguments
    /// * `customer_id` - `None` records an anonymous purchase
    /// * `lines` - requested (product, quantity) pairs; must be non-empty
    ///
    /// ## Returns
    /// * `Ok(PurchaseReceipt)` - generated id, total, and the priced lines
    /// * `Err(DbError::NotFound)` - a product id is unknown
    /// * `Err(DbError::InsufficientStock)` - a line (or the combination of
    ///   lines for one product) exceeds available stock
    ///
    /// On any error the transaction rolls back and no state changes.
    pub async fn create(
        &self,
        customer_id: Option<i64>,
        lines: &[OrderLine],
    ) -> DbResult<PurchaseReceipt> {
        if lines.is_empty() {
            return Err(DbError::EmptyPurchase);
        }

        debug!(customer_id = ?customer_id, lines = lines.len(), "Creating purchase");

        let mut tx = self.pool.begin().await?;

        // Validate every line before any write, snapshotting unit prices.
        let mut priced: Vec<(i64, PurchaseLine)> = Vec::with_capacity(lines.len());
        let mut total = Money::zero();

        for line in lines {
            let product = sqlx::query_as::<_, Product>(
                r#"
                SELECT id, name, price_cents, quantity, category, created_at, updated_at
                FROM products WHERE id = ?1
                "#,
            )
            .bind(line.product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Product", line.product_id.to_string()))?;

            if !product.can_deduct(line.quantity) {
                return Err(DbError::InsufficientStock {
                    product: product.name,
                    available: product.quantity,
                    requested: line.quantity,
                });
            }

            let unit_price = product.price();
            total += unit_price.multiply_quantity(line.quantity);
            priced.push((
                product.id,
                PurchaseLine {
                    product: product.name,
                    quantity: line.quantity,
                    unit_price,
                },
            ));
        }

        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO purchases (customer_id, total_cents, purchase_date) VALUES (?1, ?2, ?3)",
        )
        .bind(customer_id)
        .bind(total.cents())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let purchase_id = result.last_insert_rowid();

        for (product_id, line) in &priced {
            sqlx::query(
                r#"
                INSERT INTO purchase_items (purchase_id, product_id, quantity, price_per_unit_cents)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )
            .bind(purchase_id)
            .bind(product_id)
            .bind(line.quantity)
            .bind(line.unit_price.cents())
            .execute(&mut *tx)
            .await?;

            let updated = sqlx::query(
                r#"
                UPDATE products
                SET quantity = quantity - ?2, updated_at = ?3
                WHERE id = ?1 AND quantity >= ?2
                "#,
            )
            .bind(product_id)
            .bind(line.quantity)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            if updated.rows_affected() == 0 {
                let available: i64 =
                    sqlx::query_scalar("SELECT quantity FROM products WHERE id = ?1")
                        .bind(product_id)
                        .fetch_one(&mut *tx)
                        .await?;
                return Err(DbError::InsufficientStock {
                    product: line.product.clone(),
                    available,
                    requested: line.quantity,
                });
            }
        }

        tx.commit().await?;

        debug!(purchase_id = %purchase_id, total = %total, "Purchase committed");

        Ok(PurchaseReceipt {
            purchase_id,
            customer_id,
            total,
            lines: priced.into_iter().map(|(_, line)| line).collect(),
        })
    }

    /// Gets a purchase with its customer's name.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<PurchaseSummary>> {
        let summary =
            sqlx::query_as::<_, PurchaseSummary>(&format!("{SUMMARY_QUERY} WHERE p.id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(summary)
    }

    /// Gets all items of a purchase, with product names.
    pub async fn get_items(&self, purchase_id: i64) -> DbResult<Vec<PurchaseItemDetail>> {
        let items = sqlx::query_as::<_, PurchaseItemDetail>(
            r#"
            SELECT pi.id, pi.product_id, pr.name AS product_name,
                   pi.quantity, pi.price_per_unit_cents
            FROM purchase_items pi
            JOIN products pr ON pi.product_id = pr.id
            WHERE pi.purchase_id = ?1
            ORDER BY pi.id
            "#,
        )
        .bind(purchase_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists recent purchases, newest first.
    pub async fn list_recent(&self, limit: i64) -> DbResult<Vec<PurchaseSummary>> {
        let purchases = sqlx::query_as::<_, PurchaseSummary>(&format!(
            "{SUMMARY_QUERY} ORDER BY p.purchase_date DESC, p.id DESC LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(purchases)
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

    async fn seed_product(db: &Database, name: &str, cents: i64, quantity: i64) -> i64 {
        db.products()
            .add(name, Money::from_cents(cents), quantity, None)
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_create_computes_total_and_decrements_stock() {
        let db = test_db().await;
        let mouse = seed_product(&db, "Mouse", 2499, 50).await;
        let keyboard = seed_product(&db, "Keyboard", 4999, 40).await;
        let customer = db
            .customers()
            .add("John Smith", Some("john@example.com"), None)
            .await
            .unwrap();

        let receipt = db
            .purchases()
            .create(
                Some(customer.id),
                &[
                    OrderLine {
                        product_id: mouse,
                        quantity: 3,
                    },
                    OrderLine {
                        product_id: keyboard,
                        quantity: 2,
                    },
                ],
            )
            .await
            .unwrap();

        // 3 x $24.99 + 2 x $49.99 = $174.95
        assert_eq!(receipt.total.cents(), 3 * 2499 + 2 * 4999);
        assert_eq!(receipt.lines.len(), 2);

        let stored = db.purchases().get_by_id(receipt.purchase_id).await.unwrap().unwrap();
        assert_eq!(stored.total_cents, receipt.total.cents());
        assert_eq!(stored.customer_name.as_deref(), Some("John Smith"));

        // Stock decreased by exactly the purchased amounts.
        let products = db.products();
        assert_eq!(products.get_by_id(mouse).await.unwrap().unwrap().quantity, 47);
        assert_eq!(products.get_by_id(keyboard).await.unwrap().unwrap().quantity, 38);

        // Total equals the sum of quantity x snapshot over the items.
        let items = db.purchases().get_items(receipt.purchase_id).await.unwrap();
        let item_sum: i64 = items
            .iter()
            .map(|i| i.quantity * i.price_per_unit_cents)
            .sum();
        assert_eq!(item_sum, stored.total_cents);
    }

    #[tokio::test]
    async fn test_price_snapshot_survives_repricing() {
        let db = test_db().await;
        let mouse = seed_product(&db, "Mouse", 2499, 50).await;

        let receipt = db
            .purchases()
            .create(
                None,
                &[OrderLine {
                    product_id: mouse,
                    quantity: 1,
                }],
            )
            .await
            .unwrap();

        // Reprice the product afterwards; the item keeps the old price.
        db.products()
            .update(
                mouse,
                stockroom_core::ProductPatch {
                    price: Some(Money::from_cents(1999)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let items = db.purchases().get_items(receipt.purchase_id).await.unwrap();
        assert_eq!(items[0].price_per_unit_cents, 2499);
    }

    #[tokio::test]
    async fn test_insufficient_stock_fails_whole_purchase() {
        let db = test_db().await;
        let widget = seed_product(&db, "Widget", 999, 5).await;
        let gadget = seed_product(&db, "Gadget", 1999, 10).await;

        let err = db
            .purchases()
            .create(
                None,
                &[
                    OrderLine {
                        product_id: gadget,
                        quantity: 2,
                    },
                    OrderLine {
                        product_id: widget,
                        quantity: 6,
                    },
                ],
            )
            .await
            .unwrap_err();

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

        // Nothing changed: no purchase rows, all quantities intact.
        let products = db.products();
        assert_eq!(products.get_by_id(widget).await.unwrap().unwrap().quantity, 5);
        assert_eq!(products.get_by_id(gadget).await.unwrap().unwrap().quantity, 10);
        assert!(db.purchases().list_recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_repeated_product_lines_checked_against_combined_stock() {
        let db = test_db().await;
        let widget = seed_product(&db, "Widget", 999, 5).await;

        // Each line passes in isolation, but 3 + 3 > 5.
        let err = db
            .purchases()
            .create(
                None,
                &[
                    OrderLine {
                        product_id: widget,
                        quantity: 3,
                    },
                    OrderLine {
                        product_id: widget,
                        quantity: 3,
                    },
                ],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::InsufficientStock { .. }));
        let stored = db.products().get_by_id(widget).await.unwrap().unwrap();
        assert_eq!(stored.quantity, 5);
        assert!(db.purchases().list_recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_product_fails_whole_purchase() {
        let db = test_db().await;
        let widget = seed_product(&db, "Widget", 999, 5).await;

        let err = db
            .purchases()
            .create(
                None,
                &[
                    OrderLine {
                        product_id: widget,
                        quantity: 1,
                    },
                    OrderLine {
                        product_id: 404,
                        quantity: 1,
                    },
                ],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::NotFound { .. }));
        let stored = db.products().get_by_id(widget).await.unwrap().unwrap();
        assert_eq!(stored.quantity, 5);
    }

    #[tokio::test]
    async fn test_empty_purchase_rejected() {
        let db = test_db().await;

        let err = db.purchases().create(None, &[]).await.unwrap_err();
        assert!(matches!(err, DbError::EmptyPurchase));
    }

    #[tokio::test]
    async fn test_anonymous_purchase_has_no_customer() {
        let db = test_db().await;
        let mouse = seed_product(&db, "Mouse", 2499, 50).await;

        let receipt = db
            .purchases()
            .create(
                None,
                &[OrderLine {
                    product_id: mouse,
                    quantity: 1,
                }],
            )
            .await
            .unwrap();

        let stored = db.purchases().get_by_id(receipt.purchase_id).await.unwrap().unwrap();
        assert_eq!(stored.customer_id, None);
        assert_eq!(stored.customer_name, None);
    }

    #[tokio::test]
    async fn test_deleting_customer_nulls_purchase_reference() {
        let db = test_db().await;
        let mouse = seed_product(&db, "Mouse", 2499, 50).await;
        let customer = db.customers().add("Jane Doe", None, None).await.unwrap();

        let receipt = db
            .purchases()
            .create(
                Some(customer.id),
                &[OrderLine {
                    product_id: mouse,
                    quantity: 1,
                }],
            )
            .await
            .unwrap();

        db.customers().delete(customer.id).await.unwrap();

        let stored = db.purchases().get_by_id(receipt.purchase_id).await.unwrap().unwrap();
        assert_eq!(stored.customer_id, None);
        assert_eq!(stored.customer_name, None);
        assert_eq!(stored.total_cents, 2499);
    }

    #[tokio::test]
    async fn test_list_recent_is_newest_first() {
        let db = test_db().await;
        let mouse = seed_product(&db, "Mouse", 2499, 50).await;

        let first = db
            .purchases()
            .create(None, &[OrderLine { product_id: mouse, quantity: 1 }])
            .await
            .unwrap();
        let second = db
            .purchases()
            .create(None, &[OrderLine { product_id: mouse, quantity: 2 }])
            .await
            .unwrap();

        let recent = db.purchases().list_recent(10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].id, second.purchase_id);
        assert_eq!(recent[1].id, first.purchase_id);

        let capped = db.purchases().list_recent(1).await.unwrap();
        assert_eq!(capped.len(), 1);
        assert_eq!(capped[0].id, second.purchase_id);
    }
}
