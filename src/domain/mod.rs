//! Domain logic - pure business rules independent of git operations and disk

pub mod commit;
pub mod dependents;
pub mod package;
pub mod version;

pub use commit::ParsedCommit;
pub use dependents::{build_dependent_table, DependentTable};
pub use package::{clean_package_path, package_map, MarkedPackage, PackageManifest, PackageMap};
pub use version::{increment, increment_with_identifier, ReleaseType};
