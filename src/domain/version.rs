//! Semantic version arithmetic
//!
//! Increments follow the node-semver rules that package managers apply to
//! `package.json` versions, including the pre-release variants.

use crate::error::{MultiVersionError, Result};
use semver::{BuildMetadata, Prerelease, Version};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, trace};

/// Release type requested by a commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseType {
    Major,
    Minor,
    Patch,
    Premajor,
    Preminor,
    Prepatch,
    Prerelease,
}

impl ReleaseType {
    /// The pre-release counterpart of a plain release type
    pub fn to_prerelease(self) -> Self {
        match self {
            ReleaseType::Major => ReleaseType::Premajor,
            ReleaseType::Minor => ReleaseType::Preminor,
            ReleaseType::Patch => ReleaseType::Prepatch,
            other => other,
        }
    }

    pub fn is_prerelease(self) -> bool {
        matches!(
            self,
            ReleaseType::Premajor
                | ReleaseType::Preminor
                | ReleaseType::Prepatch
                | ReleaseType::Prerelease
        )
    }
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReleaseType::Major => "major",
            ReleaseType::Minor => "minor",
            ReleaseType::Patch => "patch",
            ReleaseType::Premajor => "premajor",
            ReleaseType::Preminor => "preminor",
            ReleaseType::Prepatch => "prepatch",
            ReleaseType::Prerelease => "prerelease",
        };
        f.write_str(name)
    }
}

impl FromStr for ReleaseType {
    type Err = MultiVersionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "major" => Ok(ReleaseType::Major),
            "minor" => Ok(ReleaseType::Minor),
            "patch" => Ok(ReleaseType::Patch),
            "premajor" => Ok(ReleaseType::Premajor),
            "preminor" => Ok(ReleaseType::Preminor),
            "prepatch" => Ok(ReleaseType::Prepatch),
            "prerelease" => Ok(ReleaseType::Prerelease),
            other => Err(MultiVersionError::invalid_version(format!(
                "Unknown release type: '{}'",
                other
            ))),
        }
    }
}

/// Parse a version string, accepting a leading `v`
pub fn parse_version(version: &str) -> Result<Version> {
    let clean = version.trim();
    let clean = clean.strip_prefix('v').unwrap_or(clean);

    Version::parse(clean).map_err(|e| {
        trace!(version, "invalid semver version");
        MultiVersionError::invalid_version(format!("Invalid SemVer version: {}", version))
            .with_source(e)
    })
}

/// Increment `version` by `release_type`
///
/// An absent release type leaves the version untouched, invalid or not.
pub fn increment(version: &str, release_type: Option<ReleaseType>) -> Result<String> {
    increment_with_identifier(version, release_type, None)
}

/// Increment `version`, naming the pre-release channel for the `pre*` types
pub fn increment_with_identifier(
    version: &str,
    release_type: Option<ReleaseType>,
    identifier: Option<&str>,
) -> Result<String> {
    let Some(release_type) = release_type else {
        debug!(version, "no release type, version left unchanged");
        return Ok(version.to_string());
    };

    let current = parse_version(version)?;
    let next = bump(current, release_type, identifier).map_err(|e| {
        MultiVersionError::invalid_version(format!(
            "Invalid SemVer version {} for release type {}",
            version, release_type
        ))
        .with_source(e)
    })?;

    let next = next.to_string();
    info!(from = version, to = %next, %release_type, "version incremented");
    Ok(next)
}

/// Choose the release type for a pre-release channel
///
/// A version already on the `identifier` channel only moves its counter;
/// anything else starts a new pre-release of the requested size.
pub fn prerelease_step(version: &str, release_type: ReleaseType, identifier: &str) -> ReleaseType {
    let on_channel = parse_version(version)
        .map(|v| v.pre.as_str().split('.').next() == Some(identifier))
        .unwrap_or(false);

    if on_channel {
        ReleaseType::Prerelease
    } else {
        release_type.to_prerelease()
    }
}

fn bump(
    mut v: Version,
    release_type: ReleaseType,
    identifier: Option<&str>,
) -> std::result::Result<Version, String> {
    v.build = BuildMetadata::EMPTY;

    match release_type {
        ReleaseType::Major => {
            if v.minor != 0 || v.patch != 0 || v.pre.is_empty() {
                v.major = checked_inc(v.major)?;
            }
            v.minor = 0;
            v.patch = 0;
            v.pre = Prerelease::EMPTY;
        }
        ReleaseType::Minor => {
            if v.patch != 0 || v.pre.is_empty() {
                v.minor = checked_inc(v.minor)?;
            }
            v.patch = 0;
            v.pre = Prerelease::EMPTY;
        }
        ReleaseType::Patch => {
            if v.pre.is_empty() {
                v.patch = checked_inc(v.patch)?;
            }
            v.pre = Prerelease::EMPTY;
        }
        ReleaseType::Premajor => {
            v.pre = Prerelease::EMPTY;
            v.patch = 0;
            v.minor = 0;
            v.major = checked_inc(v.major)?;
            v.pre = next_prerelease(&v.pre, identifier)?;
        }
        ReleaseType::Preminor => {
            v.pre = Prerelease::EMPTY;
            v.patch = 0;
            v.minor = checked_inc(v.minor)?;
            v.pre = next_prerelease(&v.pre, identifier)?;
        }
        ReleaseType::Prepatch => {
            v.pre = Prerelease::EMPTY;
            v = bump(v, ReleaseType::Patch, identifier)?;
            v.pre = next_prerelease(&v.pre, identifier)?;
        }
        ReleaseType::Prerelease => {
            if v.pre.is_empty() {
                v = bump(v, ReleaseType::Patch, identifier)?;
            }
            v.pre = next_prerelease(&v.pre, identifier)?;
        }
    }

    Ok(v)
}

fn checked_inc(n: u64) -> std::result::Result<u64, String> {
    n.checked_add(1)
        .ok_or_else(|| format!("version component {} overflows", n))
}

/// Move the pre-release counter forward, switching channel when needed
fn next_prerelease(
    current: &Prerelease,
    identifier: Option<&str>,
) -> std::result::Result<Prerelease, String> {
    let mut parts: Vec<String> = if current.is_empty() {
        vec!["0".to_string()]
    } else {
        let mut parts: Vec<String> = current.as_str().split('.').map(String::from).collect();
        let last_numeric = parts
            .iter()
            .rposition(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()));

        match last_numeric {
            Some(i) => {
                let n: u64 = parts[i].parse().map_err(|e| format!("{}", e))?;
                parts[i] = checked_inc(n)?.to_string();
            }
            None => parts.push("0".to_string()),
        }
        parts
    };

    if let Some(id) = identifier {
        let same_channel = parts.first().map(String::as_str) == Some(id);
        let has_counter = parts
            .get(1)
            .map(|p| p.chars().all(|c| c.is_ascii_digit()))
            .unwrap_or(false);

        if !same_channel || !has_counter {
            parts = vec![id.to_string(), "0".to_string()];
        }
    }

    Prerelease::new(&parts.join(".")).map_err(|e| e.to_string())
}
