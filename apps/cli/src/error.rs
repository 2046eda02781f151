//! # Application Error Type
//!
//! Unified error type for shell operations. The menu loop renders these
//! as plain text and returns to the prompt; nothing here aborts the
//! process.

use thiserror::Error;

use stockroom_audit::AuditError;
use stockroom_core::ValidationError;
use stockroom_db::DbError;

/// Errors surfaced by [`crate::App`] operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// Input failed a validation rule before any state change.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Persistence or business-rule failure.
    #[error(transparent)]
    Db(#[from] DbError),

    /// Audit log failure on a read path.
    ///
    /// Write-path audit failures never surface here; they are logged and
    /// swallowed (the mirror is best-effort).
    #[error(transparent)]
    Audit(#[from] AuditError),

    /// Console I/O failure (stdin closed, broken pipe).
    #[error("Console I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for shell operations.
pub type AppResult<T> = Result<T, AppError>;
