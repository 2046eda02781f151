//! # Application Facade
//!
//! `App` owns the two long-lived resources (database pool, audit log) and
//! exposes the operations the menu offers. Both resources are passed in
//! explicitly, which keeps the facade testable end-to-end without any
//! ambient state.
//!
//! ## Audit Policy
//! Mutations that change stock or record purchases commit an audit entry
//! AFTER the database write succeeds. A failing audit commit is logged
//! with `warn!` and swallowed; the data mutation stands.

use tracing::warn;

use crate::error::AppResult;
use stockroom_audit::{AuditLog, AuditResult};
use stockroom_core::{
    validation, Customer, Money, OrderLine, Product, ProductPatch, PurchaseItemDetail,
    PurchaseReceipt, PurchaseSummary, StockChange,
};
use stockroom_db::Database;

/// Name rendered for purchases without a customer.
pub const ANONYMOUS: &str = "Anonymous";

/// Sample products installed by `seed_demo_data`.
const DEMO_PRODUCTS: [(&str, i64, i64, &str); 8] = [
    ("Laptop", 99999, 10, "Electronics"),
    ("Smartphone", 59999, 20, "Electronics"),
    ("Headphones", 8999, 30, "Accessories"),
    ("Mouse", 2499, 50, "Accessories"),
    ("Keyboard", 4999, 40, "Accessories"),
    ("Monitor", 29999, 15, "Electronics"),
    ("USB Drive", 1999, 100, "Storage"),
    ("External HDD", 7999, 25, "Storage"),
];

/// Sample customers installed by `seed_demo_data`.
const DEMO_CUSTOMERS: [(&str, &str, &str); 3] = [
    ("John Smith", "john@example.com", "555-1234"),
    ("Jane Doe", "jane@example.com", "555-5678"),
    ("Bob Johnson", "bob@example.com", "555-9012"),
];

/// The application facade: one database, one audit log, the menu's
/// operations.
#[derive(Debug)]
pub struct App {
    db: Database,
    audit: AuditLog,
}

impl App {
    /// Creates the facade over an opened database and audit log.
    pub fn new(db: Database, audit: AuditLog) -> Self {
        App { db, audit }
    }

    /// Direct database access, for flows the facade doesn't wrap.
    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Direct audit log access.
    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Lists all products, ordered by name.
    pub async fn list_products(&self) -> AppResult<Vec<Product>> {
        Ok(self.db.products().list_all().await?)
    }

    /// Adds a product and records an inventory-change audit entry
    /// (`0 -> quantity`).
    pub async fn add_product(
        &self,
        name: &str,
        price: Money,
        quantity: i64,
        category: Option<&str>,
    ) -> AppResult<Product> {
        validation::validate_product_name(name)?;
        validation::validate_price(price)?;
        validation::validate_stock_quantity(quantity)?;

        let product = self
            .db
            .products()
            .add(name.trim(), price, quantity, category)
            .await?;

        self.record_audit(self.audit.record_inventory_change(&[StockChange {
            product: product.name.clone(),
            previous: 0,
            current: product.quantity,
        }]));

        Ok(product)
    }

    /// Validates and applies a partial update. Omitted fields keep their
    /// stored values. Does not audit; see [`App::update_product_audited`].
    pub async fn update_product(&self, id: i64, patch: ProductPatch) -> AppResult<Product> {
        if let Some(name) = &patch.name {
            validation::validate_product_name(name)?;
        }
        if let Some(price) = patch.price {
            validation::validate_price(price)?;
        }
        if let Some(quantity) = patch.quantity {
            validation::validate_stock_quantity(quantity)?;
        }

        let repo = self.db.products();
        let updated = repo.update(id, patch).await?;

        Ok(updated)
    }

    /// Like [`App::update_product`], but returns the stock movement so
    /// callers can show it; audits when the quantity changed.
    pub async fn update_product_audited(
        &self,
        id: i64,
        patch: ProductPatch,
    ) -> AppResult<(Product, Option<StockChange>)> {
        let repo = self.db.products();
        let before = repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| stockroom_db::DbError::not_found("Product", id.to_string()))?;

        let updated = self.update_product(id, patch).await?;

        let change = (updated.quantity != before.quantity).then(|| StockChange {
            product: updated.name.clone(),
            previous: before.quantity,
            current: updated.quantity,
        });

        if let Some(change) = &change {
            self.record_audit(
                self.audit
                    .record_inventory_change(std::slice::from_ref(change)),
            );
        }

        Ok((updated, change))
    }

    // =========================================================================
    // Customers
    // =========================================================================

    /// Lists all customers, ordered by name.
    pub async fn list_customers(&self) -> AppResult<Vec<Customer>> {
        Ok(self.db.customers().list_all().await?)
    }

    /// Adds a customer. No audit entry; customer creation is not an
    /// inventory event.
    pub async fn add_customer(
        &self,
        name: &str,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> AppResult<Customer> {
        validation::validate_customer_name(name)?;
        if let Some(email) = email {
            validation::validate_email(email)?;
        }

        Ok(self.db.customers().add(name.trim(), email, phone).await?)
    }

    // =========================================================================
    // Purchases
    // =========================================================================

    /// Creates a purchase and records a `Purchase:` audit entry under the
    /// customer's name (or `Anonymous`).
    ///
    /// The database side is all-or-nothing; see
    /// [`stockroom_db::PurchaseRepository::create`].
    pub async fn make_purchase(
        &self,
        customer_id: Option<i64>,
        lines: &[OrderLine],
    ) -> AppResult<PurchaseReceipt> {
        for line in lines {
            validation::validate_line_quantity(line.quantity)?;
        }

        let customer_name = match customer_id {
            Some(id) => self
                .db
                .customers()
                .get_by_id(id)
                .await?
                .ok_or_else(|| stockroom_db::DbError::not_found("Customer", id.to_string()))?
                .name,
            None => ANONYMOUS.to_string(),
        };

        let receipt = self.db.purchases().create(customer_id, lines).await?;

        self.record_audit(self.audit.record_purchase(&customer_name, &receipt.lines));

        Ok(receipt)
    }

    /// Recent purchases from the database, newest first.
    pub async fn purchase_history(&self, limit: i64) -> AppResult<Vec<PurchaseSummary>> {
        Ok(self.db.purchases().list_recent(limit).await?)
    }

    /// Line items of one purchase.
    pub async fn purchase_items(&self, purchase_id: i64) -> AppResult<Vec<PurchaseItemDetail>> {
        Ok(self.db.purchases().get_items(purchase_id).await?)
    }

    /// Recent purchase entries from the audit log, newest first.
    ///
    /// This is a read of the mirror itself, so failures surface to the
    /// caller (unlike write-path audit failures).
    pub fn audit_purchase_history(&self, limit: usize) -> AppResult<Vec<String>> {
        Ok(self.audit.purchase_history(limit)?)
    }

    // =========================================================================
    // Demo Data
    // =========================================================================

    /// Installs the demo catalog and customers, skipping rows whose
    /// name/email already exists. Returns (products added, customers
    /// added). Records a single audit entry when anything was added.
    pub async fn seed_demo_data(&self) -> AppResult<(usize, usize)> {
        let products = self.db.products();
        let customers = self.db.customers();

        let mut changes = Vec::new();
        for (name, price_cents, quantity, category) in DEMO_PRODUCTS {
            if products.get_by_name(name).await?.is_none() {
                let product = products
                    .add(name, Money::from_cents(price_cents), quantity, Some(category))
                    .await?;
                changes.push(StockChange {
                    product: product.name,
                    previous: 0,
                    current: product.quantity,
                });
            }
        }

        let mut customers_added = 0;
        for (name, email, phone) in DEMO_CUSTOMERS {
            if customers.get_by_email(email).await?.is_none() {
                customers.add(name, Some(email), Some(phone)).await?;
                customers_added += 1;
            }
        }

        if !changes.is_empty() {
            self.record_audit(self.audit.record_inventory_change(&changes));
        }

        Ok((changes.len(), customers_added))
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Best-effort audit write: log and swallow failures.
    fn record_audit(&self, result: AuditResult<bool>) {
        match result {
            Ok(true) => {}
            Ok(false) => warn!("Audit entry skipped: working tree had no changes"),
            Err(e) => warn!(error = %e, "Audit commit failed; data mutation stands"),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use stockroom_db::{DbConfig, DbError};
    use tempfile::TempDir;

    async fn test_app() -> (TempDir, App) {
        let dir = TempDir::new().unwrap();
        let audit = AuditLog::open_or_init(dir.path()).unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("stockroom.db")))
            .await
            .unwrap();
        (dir, App::new(db, audit))
    }

    #[tokio::test]
    async fn test_add_product_validates_before_insert() {
        let (_dir, app) = test_app().await;

        let err = app
            .add_product("", Money::from_cents(100), 1, None)
            .await
            .unwrap_err();
        assert!(matches!(err, crate::AppError::Validation(_)));
        assert_eq!(app.list_products().await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_make_purchase_rejects_unknown_customer() {
        let (_dir, app) = test_app().await;
        let product = app
            .add_product("Widget", Money::from_cents(999), 5, None)
            .await
            .unwrap();

        let err = app
            .make_purchase(
                Some(99),
                &[OrderLine {
                    product_id: product.id,
                    quantity: 1,
                }],
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::AppError::Db(DbError::NotFound { .. })
        ));

        // Nothing moved.
        let stored = app.db().products().get_by_id(product.id).await.unwrap().unwrap();
        assert_eq!(stored.quantity, 5);
    }

    #[tokio::test]
    async fn test_update_product_audits_only_quantity_changes() {
        let (_dir, app) = test_app().await;
        let product = app
            .add_product("Widget", Money::from_cents(999), 5, None)
            .await
            .unwrap();

        // Price-only update: no stock movement reported.
        let (_, change) = app
            .update_product_audited(
                product.id,
                ProductPatch {
                    price: Some(Money::from_cents(1099)),
                    ..ProductPatch::default()
                },
            )
            .await
            .unwrap();
        assert!(change.is_none());

        // Quantity update: movement reported with old and new levels.
        let (_, change) = app
            .update_product_audited(
                product.id,
                ProductPatch {
                    quantity: Some(12),
                    ..ProductPatch::default()
                },
            )
            .await
            .unwrap();
        let change = change.unwrap();
        assert_eq!(change.previous, 5);
        assert_eq!(change.current, 12);
    }

    #[tokio::test]
    async fn test_seed_demo_data_is_idempotent() {
        let (_dir, app) = test_app().await;

        let (products, customers) = app.seed_demo_data().await.unwrap();
        assert_eq!(products, 8);
        assert_eq!(customers, 3);

        let (products, customers) = app.seed_demo_data().await.unwrap();
        assert_eq!(products, 0);
        assert_eq!(customers, 0);

        assert_eq!(app.list_products().await.unwrap().len(), 8);
        assert_eq!(app.list_customers().await.unwrap().len(), 3);
    }
}
