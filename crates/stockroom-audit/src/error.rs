//! # Audit Error Types

use thiserror::Error;

/// Audit mirror errors.
///
/// Mostly a thin wrapper over libgit2; the caller usually logs these and
/// carries on (the mirror is best-effort).
#[derive(Debug, Error)]
pub enum AuditError {
    /// Underlying git operation failed.
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    /// The repository path could not be used as a working directory
    /// (e.g., a bare repository).
    #[error("Not a usable working directory: {0}")]
    NoWorkdir(String),
}

/// Result type for audit operations.
pub type AuditResult<T> = Result<T, AuditError>;
