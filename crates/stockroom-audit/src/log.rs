//! # Audit Log
//!
//! The `AuditLog` wraps a git working directory and exposes the small
//! surface the rest of the system needs: stage-and-commit, and a
//! prefix-filtered walk over history.

use std::fmt;
use std::path::Path;

use chrono::Utc;
use git2::{ErrorCode, IndexAddOption, Repository, Signature, StatusOptions};
use tracing::{debug, info};

use crate::error::{AuditError, AuditResult};
use crate::message;
use stockroom_core::{PurchaseLine, StockChange};

/// Identity used for commits when the environment has no git config.
const FALLBACK_NAME: &str = "stockroom-audit";
const FALLBACK_EMAIL: &str = "audit@stockroom.local";

/// A git-backed audit log.
///
/// One `AuditLog` is created at startup for the configured working
/// directory and owned by the application shell for the life of the
/// process.
pub struct AuditLog {
    repo: Repository,
}

impl fmt::Debug for AuditLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditLog")
            .field("workdir", &self.repo.workdir())
            .finish()
    }
}

impl AuditLog {
    /// Opens an existing git working directory, or initializes a new
    /// repository at `path`.
    pub fn open_or_init(path: impl AsRef<Path>) -> AuditResult<Self> {
        let path = path.as_ref();

        let repo = match Repository::open(path) {
            Ok(repo) => {
                debug!(path = %path.display(), "Opened existing audit repository");
                repo
            }
            Err(_) => {
                info!(path = %path.display(), "Initializing new audit repository");
                Repository::init(path)?
            }
        };

        if repo.workdir().is_none() {
            return Err(AuditError::NoWorkdir(path.display().to_string()));
        }

        Ok(AuditLog { repo })
    }

    /// Returns the working directory the log commits from.
    pub fn workdir(&self) -> &Path {
        // Checked in open_or_init; a bare repository never gets this far.
        self.repo.workdir().unwrap_or_else(|| Path::new(""))
    }

    /// Stages every change in the working directory and commits it with
    /// `message`.
    ///
    /// ## Returns
    /// * `Ok(true)` - a commit was created
    /// * `Ok(false)` - nothing to commit (clean tree), no commit created
    pub fn commit_all(&self, message: &str) -> AuditResult<bool> {
        if !self.has_changes()? {
            debug!("No changes to commit");
            return Ok(false);
        }

        let mut index = self.repo.index()?;
        index.add_all(["*"], IndexAddOption::DEFAULT, None)?;
        index.write()?;

        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;
        let signature = self.signature()?;

        // First commit on an unborn branch has no parent.
        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(ref e) if e.code() == ErrorCode::UnbornBranch => None,
            Err(ref e) if e.code() == ErrorCode::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &parents,
        )?;

        debug!(title = %message.lines().next().unwrap_or(""), "Audit commit created");
        Ok(true)
    }

    /// Records a purchase: one commit titled
    /// `Purchase: <customer> - <timestamp>` with a bullet per line.
    ///
    /// Returns whether a commit was made (`false` on a clean tree).
    pub fn record_purchase(&self, customer: &str, lines: &[PurchaseLine]) -> AuditResult<bool> {
        let message = message::purchase_message(customer, Utc::now(), lines);
        self.commit_all(&message)
    }

    /// Records stock movements: one commit titled
    /// `Inventory Update: <timestamp>` with a bullet per change.
    pub fn record_inventory_change(&self, changes: &[StockChange]) -> AuditResult<bool> {
        let message = message::inventory_message(Utc::now(), changes);
        self.commit_all(&message)
    }

    /// Walks commit history newest-first and returns up to `limit`
    /// messages that begin with `prefix`.
    ///
    /// An empty repository (unborn HEAD) yields an empty list.
    pub fn entries(&self, prefix: &str, limit: usize) -> AuditResult<Vec<String>> {
        match self.repo.head() {
            Ok(_) => {}
            Err(ref e) if e.code() == ErrorCode::UnbornBranch => return Ok(Vec::new()),
            Err(ref e) if e.code() == ErrorCode::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        }

        let mut walk = self.repo.revwalk()?;
        walk.push_head()?;

        let mut messages = Vec::new();
        for oid in walk {
            if messages.len() == limit {
                break;
            }

            let commit = self.repo.find_commit(oid?)?;
            if let Some(text) = commit.message() {
                if text.starts_with(prefix) {
                    messages.push(text.to_string());
                }
            }
        }

        Ok(messages)
    }

    /// Convenience wrapper: recent purchase entries, newest first.
    pub fn purchase_history(&self, limit: usize) -> AuditResult<Vec<String>> {
        self.entries(message::PURCHASE_TAG, limit)
    }

    /// Commit identity from git config, with a fixed fallback so the log
    /// works in environments without user.name/user.email.
    fn signature(&self) -> AuditResult<Signature<'static>> {
        match self.repo.signature() {
            Ok(sig) => Ok(sig),
            Err(_) => Ok(Signature::now(FALLBACK_NAME, FALLBACK_EMAIL)?),
        }
    }

    fn has_changes(&self) -> AuditResult<bool> {
        let mut options = StatusOptions::new();
        options.include_untracked(true).recurse_untracked_dirs(true);

        let statuses = self.repo.statuses(Some(&mut options))?;
        Ok(!statuses.is_empty())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
