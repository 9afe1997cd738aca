use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use glob::{glob, Pattern};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, trace};

use crate::domain::PackageManifest;
use crate::error::{MultiVersionError, Result};
use crate::workspace::PackageSource;

const MANIFEST_NAME: &str = "package.json";

/// npm, yarn, pnpm and lerna workspaces rooted at one directory
pub struct NpmWorkspace {
    root: PathBuf,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WorkspacesField {
    List(Vec<String>),
    Object {
        #[serde(default)]
        packages: Vec<String>,
    },
}

#[derive(Deserialize)]
struct PackagesFile {
    #[serde(default)]
    packages: Vec<String>,
}

impl NpmWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        NpmWorkspace { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Workspace globs declared by the repository
    ///
    /// Looks at `package.json` `workspaces`, then `pnpm-workspace.yaml`, then
    /// `lerna.json`. An empty list means a single-package repository.
    pub fn package_patterns(&self) -> Result<Vec<String>> {
        let root_manifest = self.root.join(MANIFEST_NAME);
        if root_manifest.exists() {
            let value = read_json(&root_manifest)?;
            if let Some(field) = value.get("workspaces") {
                let workspaces: WorkspacesField =
                    serde_json::from_value(field.clone()).map_err(|e| {
                        MultiVersionError::read_file(&root_manifest).with_source(e)
                    })?;
                let patterns = match workspaces {
                    WorkspacesField::List(patterns) => patterns,
                    WorkspacesField::Object { packages } => packages,
                };
                debug!(source = "package.json", ?patterns, "workspace patterns");
                return Ok(patterns);
            }
        }

        let pnpm = self.root.join("pnpm-workspace.yaml");
        if pnpm.exists() {
            let content = read_to_string(&pnpm)?;
            let file: PackagesFile = serde_yaml::from_str(&content)
                .map_err(|e| MultiVersionError::read_file(&pnpm).with_source(e))?;
            debug!(source = "pnpm-workspace.yaml", patterns = ?file.packages, "workspace patterns");
            return Ok(file.packages);
        }

        let lerna = self.root.join("lerna.json");
        if lerna.exists() {
            let file: PackagesFile = serde_json::from_value(read_json(&lerna)?)
                .map_err(|e| MultiVersionError::read_file(&lerna).with_source(e))?;
            debug!(source = "lerna.json", patterns = ?file.packages, "workspace patterns");
            return Ok(file.packages);
        }

        Ok(Vec::new())
    }

    fn manifest_path(&self, relative_dir: &str) -> PathBuf {
        let dir = relative_dir.trim_start_matches("./");
        if dir.is_empty() || dir == "." {
            self.root.join(MANIFEST_NAME)
        } else {
            self.root.join(dir).join(MANIFEST_NAME)
        }
    }

    /// Relative directories of the manifests matched by the workspace globs
    fn discover_dirs(&self, patterns: &[String]) -> Result<Vec<String>> {
        let mut includes = Vec::new();
        let mut excludes = Vec::new();

        for pattern in patterns {
            match pattern.strip_prefix('!') {
                Some(excluded) => {
                    let excluded = clean_pattern(excluded);
                    excludes.push(Pattern::new(excluded).map_err(|e| {
                        MultiVersionError::invalid_config(format!(
                            "Invalid workspace pattern '{}'",
                            pattern
                        ))
                        .with_source(e)
                    })?);
                }
                None => includes.push(clean_pattern(pattern)),
            }
        }

        let root = Pattern::escape(&self.root.to_string_lossy());
        let mut dirs = Vec::new();

        for pattern in includes {
            let full_pattern = if pattern.is_empty() {
                Path::new(&root).join(MANIFEST_NAME)
            } else {
                Path::new(&root).join(pattern).join(MANIFEST_NAME)
            };

            let entries = glob(&full_pattern.to_string_lossy()).map_err(|e| {
                MultiVersionError::invalid_config(format!("Invalid workspace pattern '{}'", pattern))
                    .with_source(e)
            })?;

            for entry in entries {
                let manifest_path = entry.map_err(|e| {
                    let path = e.path().to_path_buf();
                    MultiVersionError::read_file(path).with_source(std::io::Error::from(e))
                })?;

                let Some(relative) = manifest_path
                    .parent()
                    .and_then(|dir| dir.strip_prefix(&self.root).ok())
                else {
                    continue;
                };

                if relative.components().any(|c| c.as_os_str() == "node_modules") {
                    continue;
                }

                let relative = relative_to_string(relative);
                if excludes.iter().any(|p| p.matches(&relative)) {
                    trace!(dir = %relative, "excluded by workspace pattern");
                    continue;
                }

                dirs.push(relative);
            }
        }

        Ok(dirs)
    }
}

fn clean_pattern(pattern: &str) -> &str {
    let pattern = pattern.trim();
    let pattern = pattern.strip_prefix("./").unwrap_or(pattern);
    let pattern = pattern.trim_end_matches('/');
    if pattern == "." {
        ""
    } else {
        pattern
    }
}

fn relative_to_string(path: &Path) -> String {
    let relative = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");

    if relative.is_empty() {
        ".".to_string()
    } else {
        relative
    }
}

fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| MultiVersionError::read_file(path).with_source(e))
}

fn read_json(path: &Path) -> Result<Value> {
    let content = read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| MultiVersionError::read_file(path).with_source(e))
}

fn dependency_names(value: &Value, field: &str) -> Vec<String> {
    value
        .get(field)
        .and_then(Value::as_object)
        .map(|deps| deps.keys().cloned().collect())
        .unwrap_or_default()
}

fn parse_manifest(path: &Path, value: &Value, relative_dir: String) -> Result<PackageManifest> {
    let name = value
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| MultiVersionError::read_file(path).with_source("missing \"name\" field"))?;

    Ok(PackageManifest {
        name: name.to_string(),
        version: value.get("version").and_then(Value::as_str).map(str::to_string),
        relative_dir,
        dependencies: dependency_names(value, "dependencies"),
        dev_dependencies: dependency_names(value, "devDependencies"),
    })
}

impl PackageSource for NpmWorkspace {
    fn load_packages(&self) -> Result<Vec<PackageManifest>> {
        let patterns = self.package_patterns()?;

        let dirs = if patterns.is_empty() {
            if self.root.join(MANIFEST_NAME).exists() {
                vec![".".to_string()]
            } else {
                Vec::new()
            }
        } else {
            self.discover_dirs(&patterns)?
        };

        let mut packages = BTreeMap::new();
        for dir in dirs {
            if packages.contains_key(&dir) {
                continue;
            }
            let path = self.manifest_path(&dir);
            let value = read_json(&path)?;
            let manifest = parse_manifest(&path, &value, dir.clone())?;
            trace!(name = %manifest.name, version = ?manifest.version, dir = %dir, "read manifest");
            packages.insert(dir, manifest);
        }

        info!(count = packages.len(), root = %self.root.display(), "discovered packages");
        Ok(packages.into_values().collect())
    }

    fn write_version(&self, package: &PackageManifest, version: &str) -> Result<()> {
        let path = self.manifest_path(&package.relative_dir);
        let mut value = read_json(&path)?;

        let Some(fields) = value.as_object_mut() else {
            return Err(MultiVersionError::write_file(&path).with_source("manifest is not a JSON object"));
        };
        fields.insert("version".to_string(), Value::String(version.to_string()));

        let mut content = serde_json::to_string_pretty(&value)
            .map_err(|e| MultiVersionError::write_file(&path).with_source(e))?;
        content.push('\n');

        fs::write(&path, content).map_err(|e| MultiVersionError::write_file(&path).with_source(e))?;
        debug!(package = %package.name, version, path = %path.display(), "wrote version");
        Ok(())
    }
}
