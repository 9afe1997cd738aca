//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the few Git
//! operations multi-version needs, with a real implementation on top of
//! `git2` and an in-memory one for tests.
//!
//! - [repository::Git2Repository]: A real implementation using the `git2` crate
//! - [mock::MockRepository]: A mock implementation for testing
//!
//! Most code should depend on the [VersionControl] trait rather than concrete
//! implementations.
//!
//! ```rust
//! # use multi_version::git::VersionControl;
//! # fn example<R: VersionControl>(repo: &R) -> multi_version::Result<()> {
//! let head = repo.head_commit()?;
//! let files = repo.changed_files(&head.hash)?;
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::error::Result;
use tracing::warn;

/// Commit information for analysis
#[derive(Debug, Clone, PartialEq)]
pub struct CommitInfo {
    /// The commit hash (shortened)
    pub hash: String,
    /// The commit message
    pub message: String,
    /// The commit author
    pub author: String,
}

/// Common git operation trait for abstraction
///
/// All methods return [crate::error::Result<T>]. Implementations map
/// underlying failures to [crate::error::MultiVersionError] variants.
pub trait VersionControl: Send + Sync {
    /// Get the commit currently checked out
    ///
    /// # Returns
    /// * `Ok(CommitInfo)` - Short hash, full message and author of HEAD
    /// * `Err` - If HEAD cannot be resolved to a commit
    fn head_commit(&self) -> Result<CommitInfo>;

    /// Get what HEAD points to, suitable for a later [VersionControl::checkout]
    ///
    /// Returns the branch name when a branch is checked out, otherwise the
    /// full commit id of the detached HEAD.
    fn current_ref(&self) -> Result<String>;

    /// List the files changed by a single commit
    ///
    /// Paths are repository-root-relative. The commit is compared with its
    /// first parent (or the empty tree for a root commit).
    fn changed_files(&self, rev: &str) -> Result<Vec<String>>;

    /// List the files changed on HEAD since it diverged from `base_branch`
    fn changed_files_since(&self, base_branch: &str) -> Result<Vec<String>>;

    /// Check out a branch or commit
    ///
    /// An `origin/` prefix is ignored. A missing local branch is created from
    /// its remote-tracking branch. Does nothing when already checked out.
    fn checkout(&self, rev: &str) -> Result<()>;

    /// Fetch `branch` from `remote` and fast-forward the local branch
    ///
    /// Does nothing when the local branch is already up to date.
    fn pull(&self, remote: &str, branch: &str) -> Result<()>;
}

/// Checks a ref back out when dropped
///
/// Used around operations that switch the working tree to another branch so
/// the original checkout comes back on success and on failure alike.
pub struct CheckoutGuard<'a, R: VersionControl> {
    repo: &'a R,
    original: String,
}

impl<'a, R: VersionControl> CheckoutGuard<'a, R> {
    /// Remember the ref currently checked out
    pub fn new(repo: &'a R) -> Result<Self> {
        let original = repo.current_ref()?;
        Ok(CheckoutGuard { repo, original })
    }

    pub fn original(&self) -> &str {
        &self.original
    }
}

impl<R: VersionControl> Drop for CheckoutGuard<'_, R> {
    fn drop(&mut self) {
        if let Err(e) = self.repo.checkout(&self.original) {
            warn!(rev = %self.original, error = %e, "failed to restore original checkout");
        }
    }
}
