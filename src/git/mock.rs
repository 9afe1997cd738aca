use crate::error::{MultiVersionError, Result};
use crate::git::{CommitInfo, VersionControl};
use std::sync::Mutex;

/// Mock repository for testing without actual git operations
///
/// Changed files are `None` to simulate a failing diff. Checkouts and pulls
/// are recorded so tests can assert on them.
pub struct MockRepository {
    head: Option<CommitInfo>,
    commit_files: Option<Vec<String>>,
    base_files: Option<Vec<String>>,
    current: Mutex<String>,
    checkouts: Mutex<Vec<String>>,
    pulls: Mutex<Vec<(String, String)>>,
}

impl MockRepository {
    /// Create a new mock repository on `main` with no commit
    pub fn new() -> Self {
        MockRepository {
            head: None,
            commit_files: Some(Vec::new()),
            base_files: None,
            current: Mutex::new("main".to_string()),
            checkouts: Mutex::new(Vec::new()),
            pulls: Mutex::new(Vec::new()),
        }
    }

    /// Set the HEAD commit message
    pub fn with_commit(mut self, message: impl Into<String>) -> Self {
        self.head = Some(CommitInfo {
            hash: "abc1234".to_string(),
            message: message.into(),
            author: "Test Author".to_string(),
        });
        self
    }

    /// Set the files changed by the HEAD commit
    pub fn with_changed_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.commit_files = Some(files.into_iter().map(Into::into).collect());
        self
    }

    /// Make the HEAD commit diff fail
    pub fn without_commit_diff(mut self) -> Self {
        self.commit_files = None;
        self
    }

    /// Set the files changed since the base branch
    pub fn with_base_diff<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.base_files = Some(files.into_iter().map(Into::into).collect());
        self
    }

    /// Set the branch checked out initially
    pub fn on_branch(self, branch: impl Into<String>) -> Self {
        if let Ok(mut current) = self.current.lock() {
            *current = branch.into();
        }
        self
    }

    /// Refs checked out so far, in order
    pub fn checkouts(&self) -> Vec<String> {
        self.checkouts.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// `(remote, branch)` pairs pulled so far, in order
    pub fn pulls(&self) -> Vec<(String, String)> {
        self.pulls.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> MultiVersionError {
    MultiVersionError::Git(git2::Error::from_str("mock repository state poisoned"))
}

impl VersionControl for MockRepository {
    fn head_commit(&self) -> Result<CommitInfo> {
        self.head
            .clone()
            .ok_or_else(|| MultiVersionError::Git(git2::Error::from_str("reference 'HEAD' not found")))
    }

    fn current_ref(&self) -> Result<String> {
        self.current.lock().map(|c| c.clone()).map_err(|_| poisoned())
    }

    fn changed_files(&self, rev: &str) -> Result<Vec<String>> {
        self.commit_files.clone().ok_or_else(|| {
            MultiVersionError::Git(git2::Error::from_str(&format!(
                "cannot diff commit '{}'",
                rev
            )))
        })
    }

    fn changed_files_since(&self, base_branch: &str) -> Result<Vec<String>> {
        self.base_files.clone().ok_or_else(|| {
            MultiVersionError::Git(git2::Error::from_str(&format!(
                "cannot find branch '{}'",
                base_branch
            )))
        })
    }

    fn checkout(&self, rev: &str) -> Result<()> {
        let rev = rev.trim_start_matches("origin/").to_string();
        let mut current = self.current.lock().map_err(|_| poisoned())?;
        if *current != rev {
            *current = rev.clone();
            self.checkouts.lock().map_err(|_| poisoned())?.push(rev);
        }
        Ok(())
    }

    fn pull(&self, remote: &str, branch: &str) -> Result<()> {
        self.pulls
            .lock()
            .map_err(|_| poisoned())?
            .push((remote.to_string(), branch.to_string()));
        Ok(())
    }
}
