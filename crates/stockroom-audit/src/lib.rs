//! # stockroom-audit: Git Audit Log Mirror
//!
//! Mirrors inventory and purchase events as commits in a git working
//! directory, so every auditable mutation leaves a human-readable trail
//! that ordinary git tooling can inspect.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          AuditLog                                       │
//! │                                                                         │
//! │  record_purchase("Jane", lines)          record_inventory_change(...)   │
//! │        │                                        │                       │
//! │        ▼                                        ▼                       │
//! │  message::purchase_message()             message::inventory_message()   │
//! │        │                                        │                       │
//! │        └──────────────┬─────────────────────────┘                       │
//! │                       ▼                                                 │
//! │                 commit_all(message)                                     │
//! │                       │  stage everything, commit only if dirty         │
//! │                       ▼                                                 │
//! │                 git repository (one commit per auditable event)         │
//! │                                                                         │
//! │  entries("Purchase:", 10) ── revwalk, newest first, prefix filter       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Message Format
//! ```text
//! Purchase: Jane Doe - 2026-08-06 14:03:11
//!
//! * Mouse x3 @ $24.99
//! * Keyboard x1 @ $49.99
//! ```
//! ```text
//! Inventory Update: 2026-08-06 14:05:42
//!
//! * Mouse: 50 -> 47
//! ```
//!
//! ## Best-Effort Contract
//! Commit creation is NOT transactional with the database write. Callers
//! log a failed audit commit and move on; the data mutation stands.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod log;
pub mod message;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{AuditError, AuditResult};
pub use log::AuditLog;
pub use message::{INVENTORY_TAG, PURCHASE_TAG};
