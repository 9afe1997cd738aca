use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{MultiVersionError, Result};

/// File name looked up at the repository root
pub const CONFIG_FILE_NAME: &str = "multiversion.toml";

/// Represents the complete configuration for multi-version.
///
/// Contains the versioning policy and the conventional commit settings used
/// to derive a release type from the current commit.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub versioning: VersioningConfig,

    #[serde(default)]
    pub conventional_commits: ConventionalCommitsConfig,
}

fn default_base_branch() -> String {
    "main".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

/// Versioning policy for the packages of the repository.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct VersioningConfig {
    /// Branch holding the versions to compare against
    #[serde(default = "default_base_branch")]
    pub base_branch: String,

    /// Move every package to one shared version
    #[serde(default)]
    pub sync_mode: bool,

    #[serde(default = "default_remote")]
    pub remote: String,

    /// Package whose version seeds the shared version in synced mode.
    /// Defaults to the first package name in lexicographic order.
    #[serde(default)]
    pub sync_reference: Option<String>,

    /// Pre-release channel (e.g. `beta`); bumps become pre-releases on it
    #[serde(default)]
    pub prerelease_id: Option<String>,
}

impl Default for VersioningConfig {
    fn default() -> Self {
        VersioningConfig {
            base_branch: default_base_branch(),
            sync_mode: false,
            remote: default_remote(),
            sync_reference: None,
            prerelease_id: None,
        }
    }
}

/// Returns the default list of breaking change indicators.
fn default_breaking_change_indicators() -> Vec<String> {
    vec![
        "BREAKING CHANGE:".to_string(),
        "BREAKING-CHANGE:".to_string(),
    ]
}

/// Returns the default list of commit types that trigger minor version bumps.
fn default_minor_types() -> Vec<String> {
    vec!["feat".to_string(), "feature".to_string()]
}

/// Configuration for conventional commit analysis.
///
/// A breaking commit requests a major bump, a commit whose type is listed in
/// `minor_types` a minor bump, a type listed in `no_release_types` no bump,
/// and anything else a patch bump.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ConventionalCommitsConfig {
    #[serde(default = "default_breaking_change_indicators")]
    pub breaking_change_indicators: Vec<String>,

    #[serde(default = "default_minor_types")]
    pub minor_types: Vec<String>,

    #[serde(default)]
    pub no_release_types: Vec<String>,
}

impl Default for ConventionalCommitsConfig {
    fn default() -> Self {
        ConventionalCommitsConfig {
            breaking_change_indicators: default_breaking_change_indicators(),
            minor_types: default_minor_types(),
            no_release_types: Vec::new(),
        }
    }
}

impl Config {
    /// Check the settings every command depends on
    pub fn validate(&self) -> Result<()> {
        if self.versioning.base_branch.trim().is_empty() {
            return Err(MultiVersionError::invalid_config(
                "Base branch must be defined",
            ));
        }

        if self.versioning.remote.trim().is_empty() {
            return Err(MultiVersionError::invalid_config("Remote must be defined"));
        }

        if let Some(id) = &self.versioning.prerelease_id {
            if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
                return Err(MultiVersionError::invalid_config(format!(
                    "Invalid pre-release identifier: '{}'",
                    id
                )));
            }
        }

        Ok(())
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `multiversion.toml` in the repository root
/// 3. `.multiversion.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
/// * `root` - Repository root searched for `multiversion.toml`
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&Path>, root: &Path) -> Result<Config> {
    let candidate = if let Some(path) = config_path {
        Some(path.to_path_buf())
    } else if root.join(CONFIG_FILE_NAME).exists() {
        Some(root.join(CONFIG_FILE_NAME))
    } else {
        dirs::config_dir()
            .map(|dir| dir.join(format!(".{}", CONFIG_FILE_NAME)))
            .filter(|path| path.exists())
    };

    let Some(path) = candidate else {
        return Ok(Config::default());
    };

    let config_str =
        fs::read_to_string(&path).map_err(|e| MultiVersionError::read_file(&path).with_source(e))?;

    toml::from_str(&config_str).map_err(|e| {
        MultiVersionError::invalid_config(format!("Cannot parse {}", path.display())).with_source(e)
    })
}
