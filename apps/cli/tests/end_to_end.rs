//! End-to-end flow: product intake, purchase, and the audit trail,
//! against a real database file inside a real git working directory.

use tempfile::TempDir;

use stockroom::App;
use stockroom_audit::AuditLog;
use stockroom_core::{Money, OrderLine};
use stockroom_db::{Database, DbConfig};

async fn bootstrap() -> (TempDir, App) {
    let dir = TempDir::new().unwrap();
    let audit = AuditLog::open_or_init(dir.path()).unwrap();
    let db = Database::new(DbConfig::new(dir.path().join("stockroom.db")))
        .await
        .unwrap();
    (dir, App::new(db, audit))
}

#[tokio::test]
async fn add_product_then_purchase_then_audit_trail() {
    let (_dir, app) = bootstrap().await;

    // Intake: Mouse at $24.99, 50 on hand.
    let mouse = app
        .add_product("Mouse", "24.99".parse().unwrap(), 50, Some("Accessories"))
        .await
        .unwrap();
    assert_eq!(mouse.price_cents, 2499);

    // New customer buys three.
    let customer = app
        .add_customer("Jane Doe", Some("jane@example.com"), Some("555-5678"))
        .await
        .unwrap();

    let receipt = app
        .make_purchase(
            Some(customer.id),
            &[OrderLine {
                product_id: mouse.id,
                quantity: 3,
            }],
        )
        .await
        .unwrap();

    // Total is 3 x $24.99 = $74.97 and stock dropped to 47.
    assert_eq!(receipt.total, Money::from_cents(7497));
    let stored = app
        .db()
        .products()
        .get_by_id(mouse.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.quantity, 47);

    // Database history agrees.
    let history = app.purchase_history(50).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].total_cents, 7497);
    assert_eq!(history[0].customer_name.as_deref(), Some("Jane Doe"));

    let items = app.purchase_items(receipt.purchase_id).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].product_name, "Mouse");
    assert_eq!(items[0].quantity, 3);
    assert_eq!(items[0].price_per_unit_cents, 2499);

    // Exactly one Purchase: entry in the audit log, carrying the line.
    let audit_history = app.audit_purchase_history(10).unwrap();
    assert_eq!(audit_history.len(), 1);
    assert!(audit_history[0].starts_with("Purchase: Jane Doe"));
    assert!(audit_history[0].contains("* Mouse x3 @ $24.99"));
}

#[tokio::test]
async fn failed_purchase_leaves_no_trace_anywhere() {
    let (_dir, app) = bootstrap().await;

    let widget = app
        .add_product("Widget", Money::from_cents(999), 5, None)
        .await
        .unwrap();

    // Requesting 6 of 5 fails the whole purchase.
    let err = app
        .make_purchase(
            None,
            &[OrderLine {
                product_id: widget.id,
                quantity: 6,
            }],
        )
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Insufficient stock"));

    // Stock unchanged, no purchase rows, no Purchase: audit entry.
    let stored = app
        .db()
        .products()
        .get_by_id(widget.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.quantity, 5);
    assert!(app.purchase_history(50).await.unwrap().is_empty());
    assert!(app.audit_purchase_history(10).unwrap().is_empty());
}

#[tokio::test]
async fn product_intake_is_mirrored_as_inventory_update() {
    let (_dir, app) = bootstrap().await;

    app.add_product("Keyboard", Money::from_cents(4999), 40, Some("Accessories"))
        .await
        .unwrap();

    let updates = app
        .audit()
        .entries(stockroom_audit::INVENTORY_TAG, 10)
        .unwrap();
    assert_eq!(updates.len(), 1);
    assert!(updates[0].contains("* Keyboard: 0 -> 40"));
}
