//! # Commit Message Builders
//!
//! Pure formatting of audit commit messages. Keeping these free of git
//! lets the exact wire format be unit tested without a repository.
//!
//! Two recognized title prefixes exist; [`crate::log::AuditLog::entries`]
//! filters history by them.

use chrono::{DateTime, Utc};

use stockroom_core::{PurchaseLine, StockChange};

/// Title prefix of purchase entries.
pub const PURCHASE_TAG: &str = "Purchase:";

/// Title prefix of inventory-change entries.
pub const INVENTORY_TAG: &str = "Inventory Update:";

/// Timestamp format used in entry titles, e.g. `2026-08-06 14:03:11`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Builds a purchase entry:
/// a title line plus one `* <product> x<qty> @ $<price>` bullet per line.
pub fn purchase_message(customer: &str, at: DateTime<Utc>, lines: &[PurchaseLine]) -> String {
    let mut message = format!(
        "{} {} - {}\n\n",
        PURCHASE_TAG,
        customer,
        at.format(TIMESTAMP_FORMAT)
    );

    for line in lines {
        message.push_str(&format!(
            "* {} x{} @ {}\n",
            line.product, line.quantity, line.unit_price
        ));
    }

    message
}

/// Builds an inventory-change entry:
/// a title line plus one `* <product>: <old> -> <new>` bullet per change.
pub fn inventory_message(at: DateTime<Utc>, changes: &[StockChange]) -> String {
    let mut message = format!("{} {}\n\n", INVENTORY_TAG, at.format(TIMESTAMP_FORMAT));

    for change in changes {
        message.push_str(&format!(
            "* {}: {} -> {}\n",
            change.product, change.previous, change.current
        ));
    }

    message
}

// =============================================================================
// Unit Tests
// =============================================================================
