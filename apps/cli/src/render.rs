//! # Table Rendering
//!
//! Grid tables for the console, built with `tabled`'s builder API.
//! Formatting only; cents become `$x.yy` strings here and nowhere else
//! in the shell.

use tabled::{builder::Builder, settings::Style};

use stockroom_core::{Customer, Product, PurchaseItemDetail, PurchaseSummary};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

fn grid(builder: Builder) -> String {
    let mut table = builder.build();
    table.with(Style::modern());
    table.to_string()
}

/// Renders the product listing.
pub fn product_table(products: &[Product]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["ID", "Name", "Price", "Quantity", "Category", "Updated"]);

    for product in products {
        builder.push_record([
            product.id.to_string(),
            product.name.clone(),
            product.price().to_string(),
            product.quantity.to_string(),
            product.category.clone().unwrap_or_else(|| "-".to_string()),
            product.updated_at.format(TIMESTAMP_FORMAT).to_string(),
        ]);
    }

    grid(builder)
}

/// Renders the customer listing.
pub fn customer_table(customers: &[Customer]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["ID", "Name", "Email", "Phone", "Created"]);

    for customer in customers {
        builder.push_record([
            customer.id.to_string(),
            customer.name.clone(),
            customer.email.clone().unwrap_or_else(|| "-".to_string()),
            customer.phone.clone().unwrap_or_else(|| "-".to_string()),
            customer.created_at.format(TIMESTAMP_FORMAT).to_string(),
        ]);
    }

    grid(builder)
}

/// Renders the purchase history listing.
pub fn purchase_table(purchases: &[PurchaseSummary]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["ID", "Customer", "Total", "Date"]);

    for purchase in purchases {
        builder.push_record([
            purchase.id.to_string(),
            purchase
                .customer_name
                .clone()
                .unwrap_or_else(|| "Anonymous".to_string()),
            stockroom_core::Money::from_cents(purchase.total_cents).to_string(),
            purchase.purchase_date.format(TIMESTAMP_FORMAT).to_string(),
        ]);
    }

    grid(builder)
}

/// Renders the line items of one purchase.
pub fn item_table(items: &[PurchaseItemDetail]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["ID", "Product", "Quantity", "Price/Unit", "Line Total"]);

    for item in items {
        let unit = stockroom_core::Money::from_cents(item.price_per_unit_cents);
        builder.push_record([
            item.id.to_string(),
            item.product_name.clone(),
            item.quantity.to_string(),
            unit.to_string(),
            unit.multiply_quantity(item.quantity).to_string(),
        ]);
    }

    grid(builder)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use stockroom_core::Money;

    #[test]
    fn test_product_table_formats_price_and_placeholder_category() {
        let now = Utc::now();
        let products = vec![Product {
            id: 1,
            name: "Mouse".to_string(),
            price_cents: 2499,
            quantity: 50,
            category: None,
            created_at: now,
            updated_at: now,
        }];

        let table = product_table(&products);
        assert!(table.contains("Mouse"));
        assert!(table.contains("$24.99"));
        assert!(table.contains('-'));
    }

    #[test]
    fn test_item_table_computes_line_totals() {
        let items = vec![PurchaseItemDetail {
            id: 1,
            product_id: 1,
            product_name: "Mouse".to_string(),
            quantity: 3,
            price_per_unit_cents: 2499,
        }];

        let table = item_table(&items);
        assert!(table.contains("$24.99"));
        assert!(table.contains("$74.97"));
    }

    #[test]
    fn test_purchase_table_shows_anonymous() {
        let purchases = vec![PurchaseSummary {
            id: 1,
            customer_id: None,
            customer_name: None,
            total_cents: 7497,
            purchase_date: Utc::now(),
        }];

        let table = purchase_table(&purchases);
        assert!(table.contains("Anonymous"));
        assert!(table.contains(&Money::from_cents(7497).to_string()));
    }
}
