use std::collections::BTreeSet;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::ConventionalCommitsConfig;
use crate::domain::{ParsedCommit, ReleaseType};
use crate::error::{MultiVersionError, Result};
use crate::git::{CommitInfo, VersionControl};

/// Classifies the HEAD commit and reports what it touched
pub struct CommitAnalyzer<'a, R: VersionControl> {
    repo: &'a R,
    config: ConventionalCommitsConfig,
    commit: Option<(CommitInfo, ParsedCommit)>,
}

impl<'a, R: VersionControl> CommitAnalyzer<'a, R> {
    /// Create a new commit analyzer
    pub fn new(repo: &'a R, config: ConventionalCommitsConfig) -> Self {
        CommitAnalyzer {
            repo,
            config,
            commit: None,
        }
    }

    /// Read and parse the HEAD commit
    pub fn load_commit(&mut self) -> Result<&ParsedCommit> {
        let info = self.repo.head_commit().map_err(|e| {
            MultiVersionError::invalid_commit("Unable to read the HEAD commit").with_source(e)
        })?;

        if info.message.trim().is_empty() {
            return Err(MultiVersionError::invalid_commit("Commit message is null"));
        }

        let parsed = ParsedCommit::parse(&info.message, &self.config.breaking_change_indicators);
        info!(
            hash = %info.hash,
            author = %info.author,
            commit_type = %parsed.r#type,
            breaking = parsed.is_breaking_change,
            "loaded commit"
        );

        let (_, parsed) = self.commit.insert((info, parsed));
        Ok(parsed)
    }

    /// The loaded commit, if any
    pub fn commit(&self) -> Option<&CommitInfo> {
        self.commit.as_ref().map(|(info, _)| info)
    }

    /// Release type requested by the loaded commit
    ///
    /// `None` means the commit asks for no release at all.
    pub fn release_type(&self) -> Result<Option<ReleaseType>> {
        let (_, parsed) = self
            .commit
            .as_ref()
            .ok_or_else(|| MultiVersionError::invalid_commit("Commit is not loaded"))?;

        Ok(self.classify(parsed))
    }

    /// Map a parsed commit to a release type
    pub fn classify(&self, parsed: &ParsedCommit) -> Option<ReleaseType> {
        let release_type = if parsed.is_breaking_change {
            Some(ReleaseType::Major)
        } else if self.config.minor_types.contains(&parsed.r#type) {
            Some(ReleaseType::Minor)
        } else if self.config.no_release_types.contains(&parsed.r#type) {
            None
        } else {
            Some(ReleaseType::Patch)
        };

        debug!(commit_type = %parsed.r#type, ?release_type, "classified commit");
        release_type
    }

    /// Directories holding the files changed by the HEAD commit
    ///
    /// Falls back to the changes since `base_branch` when the commit diff
    /// fails or is empty. Files at the repository root are ignored.
    pub fn changed_file_paths(&self, base_branch: &str) -> Result<Vec<String>> {
        let files = match self.changed_files(base_branch) {
            Some(files) => files,
            None => {
                return Err(MultiVersionError::invalid_commit(
                    "Unable to get changed files",
                ))
            }
        };

        let dirs: BTreeSet<String> = files
            .iter()
            .filter_map(|file| Path::new(file).parent())
            .map(|dir| dir.to_string_lossy().replace('\\', "/"))
            .filter(|dir| !dir.is_empty())
            .collect();

        debug!(files = files.len(), dirs = ?dirs, "changed directories");
        Ok(dirs.into_iter().collect())
    }

    fn changed_files(&self, base_branch: &str) -> Option<Vec<String>> {
        let head = self
            .commit
            .as_ref()
            .map(|(info, _)| info.hash.as_str())
            .unwrap_or("HEAD");

        match self.repo.changed_files(head) {
            Ok(files) if !files.is_empty() => return Some(files),
            Ok(_) => debug!(rev = head, "commit has no changed files"),
            Err(e) => warn!(rev = head, error = %e, "cannot diff commit"),
        }

        match self.repo.changed_files_since(base_branch) {
            Ok(files) => Some(files),
            Err(e) => {
                warn!(base = base_branch, error = %e, "cannot diff against base branch");
                None
            }
        }
    }
}
