use std::collections::BTreeMap;

/// Manifest state of one workspace package as read from disk
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PackageManifest {
    pub name: String,
    pub version: Option<String>,
    /// Directory relative to the repository root, as reported by the provider
    pub relative_dir: String,
    pub dependencies: Vec<String>,
    pub dev_dependencies: Vec<String>,
}

impl PackageManifest {
    pub fn new(name: impl Into<String>, version: impl Into<String>, relative_dir: impl Into<String>) -> Self {
        PackageManifest {
            name: name.into(),
            version: Some(version.into()),
            relative_dir: relative_dir.into(),
            dependencies: Vec::new(),
            dev_dependencies: Vec::new(),
        }
    }

    pub fn with_dependencies<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_dev_dependencies<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dev_dependencies
            .extend(names.into_iter().map(Into::into));
        self
    }

    /// Regular and dev dependency names, in declaration order
    pub fn all_dependencies(&self) -> impl Iterator<Item = &str> {
        self.dependencies
            .iter()
            .chain(self.dev_dependencies.iter())
            .map(String::as_str)
    }
}

/// Normalize a package directory: no leading `/` or `./`, no trailing `/`
///
/// The repository root itself normalizes to an empty string.
pub fn clean_package_path(relative_dir: &str) -> String {
    let mut path = relative_dir.trim();
    path = path.strip_prefix('/').unwrap_or(path);
    path = path.strip_prefix("./").unwrap_or(path);
    path = path.strip_suffix('/').unwrap_or(path);

    if path == "." {
        String::new()
    } else {
        path.to_string()
    }
}

/// Whether a changed directory lies inside the package directory
///
/// Matching is per path component, so `packages/app` does not claim
/// `packages/app-2`. A root package (empty path) contains every non-empty
/// directory.
pub fn path_contains(package_path: &str, changed_dir: &str) -> bool {
    let changed_dir = clean_package_path(changed_dir);
    if package_path.is_empty() {
        return !changed_dir.is_empty();
    }

    changed_dir == package_path
        || changed_dir
            .strip_prefix(package_path)
            .map(|rest| rest.starts_with('/'))
            .unwrap_or(false)
}

/// A package together with its update mark for the current run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkedPackage {
    pub manifest: PackageManifest,
    /// Normalized relative path, see [clean_package_path]
    pub path: String,
    pub should_be_updated: bool,
}

impl MarkedPackage {
    pub fn new(manifest: PackageManifest, should_be_updated: bool) -> Self {
        let path = clean_package_path(&manifest.relative_dir);
        MarkedPackage {
            manifest,
            path,
            should_be_updated,
        }
    }

    pub fn name(&self) -> &str {
        &self.manifest.name
    }

    pub fn version(&self) -> Option<&str> {
        self.manifest.version.as_deref()
    }
}

/// Packages of one inventory snapshot keyed by name, in name order
pub type PackageMap = BTreeMap<String, MarkedPackage>;

/// Build a [PackageMap] from a manifest listing
///
/// A later manifest with an already seen name replaces the earlier one.
pub fn package_map(manifests: Vec<PackageManifest>, should_be_updated: bool) -> PackageMap {
    manifests
        .into_iter()
        .map(|manifest| {
            (
                manifest.name.clone(),
                MarkedPackage::new(manifest, should_be_updated),
            )
        })
        .collect()
}
