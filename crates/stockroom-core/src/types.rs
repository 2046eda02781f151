//! # Domain Types
//!
//! Core domain types used throughout Stockroom.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    Customer     │   │    Purchase     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id             │       │
//! │  │  name (unique)  │   │  name           │   │  customer_id?   │       │
//! │  │  price_cents    │   │  email? (uniq)  │   │  total_cents    │       │
//! │  │  quantity       │   │  phone?         │   │  purchase_date  │       │
//! │  └─────────────────┘   └─────────────────┘   └────────┬────────┘       │
//! │                                                       │ owns           │
//! │                                              ┌────────▼────────┐       │
//! │                                              │  PurchaseItem   │       │
//! │                                              │  ─────────────  │       │
//! │                                              │  product_id     │       │
//! │                                              │  quantity       │       │
//! │                                              │  price snapshot │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Monetary columns are stored as integer cents (`*_cents`); the [`Money`]
//! accessors are the only way values leave the cent domain.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product tracked in the inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier, assigned by the database.
    pub id: i64,

    /// Display name. Unique across the inventory.
    pub name: String,

    /// Unit price in cents.
    pub price_cents: i64,

    /// Units currently on hand. Never negative.
    pub quantity: i64,

    /// Optional free-text category.
    pub category: Option<String>,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last mutated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the unit price as a Money value.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks whether `quantity` units could be deducted without going
    /// negative.
    #[inline]
    pub fn can_deduct(&self, quantity: i64) -> bool {
        self.quantity >= quantity
    }
}

/// Partial update for a product. `None` fields keep their stored value.
///
/// ## Example
/// ```rust
/// use stockroom_core::{Money, ProductPatch};
///
/// // Reprice only; name, quantity and category stay as stored.
/// let patch = ProductPatch {
///     price: Some(Money::from_cents(1299)),
///     ..ProductPatch::default()
/// };
/// assert!(patch.name.is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<Money>,
    pub quantity: Option<i64>,
    /// `None` keeps the stored category; clearing one is not supported.
    pub category: Option<String>,
}

impl ProductPatch {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.quantity.is_none()
            && self.category.is_none()
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer that purchases products.
///
/// Customers are immutable after creation in the observed flows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: i64,
    pub name: String,
    /// Unique when present.
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Purchase
// =============================================================================

/// A completed purchase. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Purchase {
    pub id: i64,
    /// `None` means an anonymous purchase, or a deleted customer.
    pub customer_id: Option<i64>,
    /// Derived: sum of `quantity * price_per_unit_cents` over the items.
    pub total_cents: i64,
    pub purchase_date: DateTime<Utc>,
}

impl Purchase {
    /// Returns the purchase total as a Money value.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// A line item owned by a purchase.
///
/// `price_per_unit_cents` is a snapshot captured at purchase time; it stays
/// fixed even if the product is later repriced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PurchaseItem {
    pub id: i64,
    pub purchase_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub price_per_unit_cents: i64,
}

impl PurchaseItem {
    /// Returns the snapshot unit price as Money.
    #[inline]
    pub fn price_per_unit(&self) -> Money {
        Money::from_cents(self.price_per_unit_cents)
    }

    /// Returns `quantity * price_per_unit` as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price_per_unit().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Read Models
// =============================================================================

/// A purchase joined with its customer's name, for history listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PurchaseSummary {
    pub id: i64,
    pub customer_id: Option<i64>,
    /// `None` for anonymous purchases or deleted customers.
    pub customer_name: Option<String>,
    pub total_cents: i64,
    pub purchase_date: DateTime<Utc>,
}

/// A purchase item joined with its product's name, for drill-down views.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PurchaseItemDetail {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub price_per_unit_cents: i64,
}

// =============================================================================
// Operation Inputs & Receipts
// =============================================================================

/// A requested purchase line: which product, how many units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLine {
    pub product_id: i64,
    pub quantity: i64,
}

/// A priced purchase line, resolved against the catalog at purchase time.
/// This is what receipts and audit entries are built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseLine {
    /// Product name at purchase time.
    pub product: String,
    pub quantity: i64,
    /// Unit price snapshot.
    pub unit_price: Money,
}

impl PurchaseLine {
    /// Returns `quantity * unit_price`.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// The outcome of a successful purchase creation.
#[derive(Debug, Clone)]
pub struct PurchaseReceipt {
    pub purchase_id: i64,
    pub customer_id: Option<i64>,
    pub total: Money,
    pub lines: Vec<PurchaseLine>,
}

/// A recorded stock movement, in product-name terms.
///
/// Rendered in audit entries as `* <product>: <previous> -> <current>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockChange {
    pub product: String,
    pub previous: i64,
    pub current: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn widget() -> Product {
        let now = Utc::now();
        Product {
            id: 1,
            name: "Widget".to_string(),
            price_cents: 999,
            quantity: 5,
            category: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_can_deduct() {
        let product = widget();
        assert!(product.can_deduct(5));
        assert!(product.can_deduct(0));
        assert!(!product.can_deduct(6));
    }

    #[test]
    fn test_purchase_line_total() {
        let line = PurchaseLine {
            product: "Mouse".to_string(),
            quantity: 3,
            unit_price: Money::from_cents(2499),
        };
        assert_eq!(line.line_total().cents(), 7497);
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(ProductPatch::default().is_empty());

        let patch = ProductPatch {
            quantity: Some(10),
            ..ProductPatch::default()
        };
        assert!(!patch.is_empty());
    }
}
