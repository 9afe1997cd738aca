//! Package inventory providers
//!
//! A [PackageSource] lists the packages of the working tree and persists
//! new versions. [npm::NpmWorkspace] reads npm-style workspaces from disk,
//! [memory::InMemoryWorkspace] serves canned snapshots to tests.

pub mod memory;
pub mod npm;

pub use memory::InMemoryWorkspace;
pub use npm::NpmWorkspace;

use crate::domain::PackageManifest;
use crate::error::Result;

/// Source of package manifests for one repository
pub trait PackageSource: Send + Sync {
    /// Read the manifest of every package in the working tree
    ///
    /// Called again after switching branches, so implementations must not
    /// cache between calls.
    fn load_packages(&self) -> Result<Vec<PackageManifest>>;

    /// Persist `version` as the version of `package`
    fn write_version(&self, package: &PackageManifest, version: &str) -> Result<()>;
}
