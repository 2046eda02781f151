//! # Schema Creation
//!
//! Idempotent schema creation for Stockroom.
//!
//! The schema is created on startup with `CREATE TABLE IF NOT EXISTS`,
//! so opening the same database twice is safe. There is no versioned
//! migration history; the four tables below are the whole schema.
//!
//! ## Tables
//! ```text
//! products        name UNIQUE, price_cents, quantity (CHECK >= 0)
//! customers       email UNIQUE (nullable)
//! purchases       customer_id FK → customers ON DELETE SET NULL
//! purchase_items  purchase_id FK → purchases ON DELETE CASCADE
//!                 product_id  FK → products  ON DELETE CASCADE
//! ```
//!
//! Foreign key enforcement is a connection-level pragma, enabled in
//! [`crate::pool::Database::new`].

use sqlx::SqlitePool;
use tracing::info;

use crate::error::{DbError, DbResult};

/// DDL statements, executed in order. Each is idempotent.
const TABLES: [(&str, &str); 4] = [
    (
        "products",
        r#"
        CREATE TABLE IF NOT EXISTS products (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            price_cents INTEGER NOT NULL CHECK (price_cents >= 0),
            quantity INTEGER NOT NULL CHECK (quantity >= 0),
            category TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    ),
    (
        "customers",
        r#"
        CREATE TABLE IF NOT EXISTS customers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT UNIQUE,
            phone TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    ),
    (
        "purchases",
        r#"
        CREATE TABLE IF NOT EXISTS purchases (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            customer_id INTEGER REFERENCES customers(id) ON DELETE SET NULL,
            total_cents INTEGER NOT NULL CHECK (total_cents >= 0),
            purchase_date TEXT NOT NULL
        )
        "#,
    ),
    (
        "purchase_items",
        r#"
        CREATE TABLE IF NOT EXISTS purchase_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            purchase_id INTEGER NOT NULL REFERENCES purchases(id) ON DELETE CASCADE,
            product_id INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
            quantity INTEGER NOT NULL CHECK (quantity > 0),
            price_per_unit_cents INTEGER NOT NULL CHECK (price_per_unit_cents >= 0)
        )
        "#,
    ),
];

/// Creates all tables if they don't exist.
///
/// ## Safety
/// - Idempotent: safe to run multiple times
/// - Ordered: referenced tables are created before referencing ones
pub async fn initialize(pool: &SqlitePool) -> DbResult<()> {
    info!("Creating schema if absent");

    for (table, ddl) in TABLES {
        sqlx::query(ddl)
            .execute(pool)
            .await
            .map_err(|e| DbError::SchemaFailed(format!("table {table}: {e}")))?;
    }

    info!("Schema ready");
    Ok(())
}

/// Returns the number of user tables present (for diagnostics).
pub async fn table_count(pool: &SqlitePool) -> DbResult<usize> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
    )
    .fetch_one(pool)
    .await?;

    Ok(count as usize)
}
