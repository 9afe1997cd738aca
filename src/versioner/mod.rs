//! Version reconciliation across the packages of a repository
//!
//! A [Versioner] run goes through these stages:
//!
//! ```text
//! Uninitialized -> CommitLoaded -> PackagesMarked -> (BaseBranchSynced) -> Reconciled
//! ```
//!
//! Loading the commit yields the release type. Marking reads the package
//! inventory, finds the packages touched by the commit and, in independent
//! mode, extends the mark to everything that depends on them. Validation
//! then compares the committed versions with the base branch, while a bump
//! writes the new versions to the manifests.

pub mod report;

pub use report::{
    BumpReport, CheckOutcome, PackageCheck, SkipReason, ValidationReport, VersionChange,
};

use std::collections::BTreeSet;

use tracing::{debug, error, info, trace};

use crate::analyzer::CommitAnalyzer;
use crate::config::Config;
use crate::domain::package::path_contains;
use crate::domain::version::prerelease_step;
use crate::domain::{
    build_dependent_table, increment_with_identifier, package_map, MarkedPackage, PackageMap,
    ReleaseType,
};
use crate::error::{MultiVersionError, Result};
use crate::git::{CheckoutGuard, VersionControl};
use crate::workspace::PackageSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Uninitialized,
    CommitLoaded,
    PackagesMarked,
    BaseBranchSynced,
    Reconciled,
}

pub struct Versioner<'a, R: VersionControl, W: PackageSource> {
    config: Config,
    repo: &'a R,
    workspace: &'a W,
    analyzer: CommitAnalyzer<'a, R>,
    release_type: Option<ReleaseType>,
    packages: PackageMap,
    changed: BTreeSet<String>,
    synced_version: Option<String>,
    stage: Stage,
}

impl<'a, R: VersionControl, W: PackageSource> Versioner<'a, R, W> {
    pub fn new(config: Config, repo: &'a R, workspace: &'a W) -> Self {
        let analyzer = CommitAnalyzer::new(repo, config.conventional_commits.clone());

        Versioner {
            config,
            repo,
            workspace,
            analyzer,
            release_type: None,
            packages: PackageMap::new(),
            changed: BTreeSet::new(),
            synced_version: None,
            stage: Stage::Uninitialized,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn release_type(&self) -> Option<ReleaseType> {
        self.release_type
    }

    /// Packages of the working tree with their update marks
    pub fn packages(&self) -> &PackageMap {
        &self.packages
    }

    /// Packages whose directory holds a changed file
    pub fn changed_packages(&self) -> &BTreeSet<String> {
        &self.changed
    }

    /// Version every package moves to in synced mode, before the bump
    pub fn synced_version(&self) -> Option<&str> {
        self.synced_version.as_deref()
    }

    /// Load the HEAD commit and derive its release type
    pub fn initialize(&mut self) -> Result<()> {
        debug!(config = ?self.config, "configuration loaded");

        self.analyzer.load_commit()?;
        self.release_type = self.analyzer.release_type()?;
        info!(release_type = ?self.release_type, "release type");

        self.stage = Stage::CommitLoaded;
        Ok(())
    }

    /// Mark the changed packages and, in independent mode, their dependents
    ///
    /// In synced mode every package starts marked and the synced version is
    /// captured from the reference package.
    pub fn mark_changed_and_propagate(&mut self) -> Result<()> {
        if self.stage == Stage::Uninitialized {
            self.initialize()?;
        }
        debug!("finding changed packages and marking their update status");

        let sync_mode = self.config.versioning.sync_mode;
        self.packages = package_map(self.workspace.load_packages()?, sync_mode);

        let changed_dirs = self
            .analyzer
            .changed_file_paths(&self.config.versioning.base_branch)?;
        self.changed = changed_package_names(&self.packages, &changed_dirs);
        debug!(changed = ?self.changed, "changed packages");

        if sync_mode {
            self.synced_version = self.sync_reference()?.and_then(|p| p.version().map(String::from));
            info!(version = ?self.synced_version, "expected synced version");
        } else {
            self.propagate();
        }

        trace!("packages marked");
        self.stage = Stage::PackagesMarked;
        Ok(())
    }

    /// Check the committed versions against the base branch
    ///
    /// Fails on the first package whose version is not the expected one.
    /// The ref checked out on entry is checked out again on return.
    pub fn validate(&mut self) -> Result<ValidationReport> {
        self.config.validate()?;
        self.initialize()?;
        self.mark_changed_and_propagate()?;

        let original = {
            let _restore = CheckoutGuard::new(self.repo)?;
            self.pull_base_branch()?;
            package_map(self.workspace.load_packages()?, false)
        };

        let mut report = ValidationReport {
            release_type: self.release_type,
            checks: Vec::new(),
        };

        for (name, package) in &self.packages {
            let original_version = original.get(name).and_then(MarkedPackage::version);
            let outcome = self.check_package(package, original_version)?;
            report.checks.push(PackageCheck {
                name: name.clone(),
                outcome,
            });
        }

        for name in original.keys().filter(|n| !self.packages.contains_key(*n)) {
            info!(package = %name, "package has been removed by this commit, version validation will be skipped");
            report.checks.push(PackageCheck {
                name: name.clone(),
                outcome: CheckOutcome::Skipped(SkipReason::Removed),
            });
        }

        self.stage = Stage::Reconciled;
        Ok(report)
    }

    /// Write the next version of every marked package
    ///
    /// The working tree manifests are the starting point. Packages already
    /// at their next version are left untouched.
    pub fn bump(&mut self) -> Result<BumpReport> {
        self.config.validate()?;
        self.initialize()?;
        self.mark_changed_and_propagate()?;

        let synced_target = if self.config.versioning.sync_mode {
            let Some(reference) = self.synced_version.as_deref() else {
                error!("expected version is null (Synced mode ON)");
                return Err(MultiVersionError::invalid_version_bump(
                    "Expected version is null (Synced mode ON)",
                ));
            };
            Some(self.next_version(reference)?)
        } else {
            None
        };

        let mut report = BumpReport {
            release_type: self.release_type,
            changes: Vec::new(),
        };

        for (name, package) in &self.packages {
            if !package.should_be_updated {
                continue;
            }
            let Some(current) = package.version() else {
                debug!(package = %name, "no version, nothing to bump");
                continue;
            };

            let next = match &synced_target {
                Some(target) => target.clone(),
                None => self.next_version(current)?,
            };
            if next == current {
                continue;
            }

            self.workspace.write_version(&package.manifest, &next)?;
            info!(package = %name, from = current, to = %next, "bumped");
            report.changes.push(VersionChange {
                name: name.clone(),
                from: current.to_string(),
                to: next,
            });
        }

        self.stage = Stage::Reconciled;
        Ok(report)
    }

    fn propagate(&mut self) {
        trace!("marking packages update status");
        let dependents = build_dependent_table(&self.packages);

        let mut marked: BTreeSet<String> = BTreeSet::new();
        for name in &self.changed {
            marked.insert(name.clone());
            if let Some(names) = dependents.get(name) {
                trace!(package = %name, dependents = ?names, "dependents should be updated");
                marked.extend(names.iter().cloned());
            }
        }

        for (name, package) in self.packages.iter_mut() {
            package.should_be_updated = package.should_be_updated || marked.contains(name);
            debug!(package = %name, should_be_updated = package.should_be_updated, "update status");
        }
    }

    /// Package whose version seeds the synced version
    fn sync_reference(&self) -> Result<Option<&MarkedPackage>> {
        match &self.config.versioning.sync_reference {
            Some(name) => self.packages.get(name).map(Some).ok_or_else(|| {
                MultiVersionError::invalid_config(format!(
                    "Synced reference package '{}' not found",
                    name
                ))
            }),
            None => Ok(self.packages.values().next()),
        }
    }

    fn pull_base_branch(&mut self) -> Result<()> {
        let base_branch = self.config.versioning.base_branch.as_str();
        if base_branch.trim().is_empty() {
            return Err(MultiVersionError::invalid_config("Base branch must be defined"));
        }
        debug!(branch = base_branch, "pulling base branch");

        self.repo.checkout(base_branch)?;
        self.repo.pull(&self.config.versioning.remote, base_branch)?;

        debug!(branch = base_branch, "base branch pulled");
        self.stage = Stage::BaseBranchSynced;
        Ok(())
    }

    fn next_version(&self, version: &str) -> Result<String> {
        let identifier = self.config.versioning.prerelease_id.as_deref();
        let release_type = match (self.release_type, identifier) {
            (Some(release_type), Some(id)) => Some(prerelease_step(version, release_type, id)),
            (release_type, _) => release_type,
        };

        increment_with_identifier(version, release_type, identifier)
    }

    fn check_package(
        &self,
        package: &MarkedPackage,
        original_version: Option<&str>,
    ) -> Result<CheckOutcome> {
        let name = package.name();
        let sync_mode = self.config.versioning.sync_mode;

        let Some(actual) = package.version() else {
            info!(package = %name, "package has been removed by this commit, version validation will be skipped");
            return Ok(CheckOutcome::Skipped(SkipReason::Removed));
        };

        if original_version.is_none() && !sync_mode {
            info!(package = %name, "package has been added by this commit (Synced mode OFF), version validation will be skipped");
            return Ok(CheckOutcome::Skipped(SkipReason::Added));
        }

        let expected = match original_version {
            _ if !package.should_be_updated => original_version.map(String::from),
            Some(original) if !sync_mode => Some(self.next_version(original)?),
            _ => self.synced_version.clone(),
        };

        let Some(expected) = expected else {
            error!(package = %name, "expected version is null (Synced mode ON)");
            return Err(MultiVersionError::invalid_version_bump(
                "Expected version is null (Synced mode ON)",
            ));
        };

        if actual != expected {
            error!(package = %name, actual, %expected, "committed version does not correspond to expected version for release type");
            return Err(MultiVersionError::invalid_version_bump(format!(
                "Commited version {} does not match expected {} for release type {}: {}",
                actual,
                expected,
                self.release_type.map(|r| r.to_string()).unwrap_or_default(),
                name
            )));
        }

        info!(
            package = %name,
            from = original_version.unwrap_or(""),
            to = %expected,
            "package properly versioned"
        );
        Ok(CheckOutcome::Passed {
            from: original_version.map(String::from),
            to: expected,
        })
    }
}

/// Names of the packages whose directory contains one of `changed_dirs`
fn changed_package_names(packages: &PackageMap, changed_dirs: &[String]) -> BTreeSet<String> {
    packages
        .iter()
        .filter(|(_, package)| {
            changed_dirs
                .iter()
                .any(|dir| path_contains(&package.path, dir))
        })
        .map(|(name, _)| name.clone())
        .collect()
}
