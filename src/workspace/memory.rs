use std::collections::VecDeque;
use std::sync::Mutex;

use crate::domain::PackageManifest;
use crate::error::{MultiVersionError, Result};
use crate::workspace::PackageSource;

/// Package source backed by canned snapshots
///
/// Each load returns the next snapshot; the last one is returned for every
/// load after that. Written versions are recorded, not applied.
pub struct InMemoryWorkspace {
    snapshots: Mutex<VecDeque<Vec<PackageManifest>>>,
    writes: Mutex<Vec<(String, String)>>,
}

impl InMemoryWorkspace {
    pub fn new(packages: Vec<PackageManifest>) -> Self {
        InMemoryWorkspace {
            snapshots: Mutex::new(VecDeque::from([packages])),
            writes: Mutex::new(Vec::new()),
        }
    }

    /// Queue the snapshot returned by the following load
    pub fn then_load(self, packages: Vec<PackageManifest>) -> Self {
        if let Ok(mut snapshots) = self.snapshots.lock() {
            snapshots.push_back(packages);
        }
        self
    }

    /// `(package name, version)` pairs written so far, in order
    pub fn writes(&self) -> Vec<(String, String)> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }
}

fn poisoned() -> MultiVersionError {
    MultiVersionError::invalid_config("in-memory workspace state poisoned")
}

impl PackageSource for InMemoryWorkspace {
    fn load_packages(&self) -> Result<Vec<PackageManifest>> {
        let mut snapshots = self.snapshots.lock().map_err(|_| poisoned())?;

        if snapshots.len() > 1 {
            Ok(snapshots.pop_front().unwrap_or_default())
        } else {
            Ok(snapshots.front().cloned().unwrap_or_default())
        }
    }

    fn write_version(&self, package: &PackageManifest, version: &str) -> Result<()> {
        self.writes
            .lock()
            .map_err(|_| poisoned())?
            .push((package.name.clone(), version.to_string()));
        Ok(())
    }
}
