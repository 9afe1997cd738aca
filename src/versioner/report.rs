//! Outcomes of a versioning run

use std::fmt;

use crate::domain::ReleaseType;

/// Why a package was left out of validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The package has no version in the working tree
    Removed,
    /// The package does not exist on the base branch and versions are independent
    Added,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Removed => f.write_str("removed by this commit"),
            SkipReason::Added => f.write_str("added by this commit"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The committed version is the expected one
    Passed { from: Option<String>, to: String },
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageCheck {
    pub name: String,
    pub outcome: CheckOutcome,
}

/// Result of a successful validation, one entry per package
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationReport {
    pub release_type: Option<ReleaseType>,
    pub checks: Vec<PackageCheck>,
}

impl ValidationReport {
    pub fn passed(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| matches!(c.outcome, CheckOutcome::Passed { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.checks.len() - self.passed()
    }

    /// Outcome recorded for `name`
    pub fn outcome(&self, name: &str) -> Option<&CheckOutcome> {
        self.checks
            .iter()
            .find(|c| c.name == name)
            .map(|c| &c.outcome)
    }
}

/// A version written by a bump
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionChange {
    pub name: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BumpReport {
    pub release_type: Option<ReleaseType>,
    pub changes: Vec<VersionChange>,
}

impl BumpReport {
    /// New version written for `name`, if any
    pub fn version_of(&self, name: &str) -> Option<&str> {
        self.changes
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.to.as_str())
    }
}
