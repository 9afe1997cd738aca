//! Transitive dependents of workspace packages

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use tracing::trace;

use super::package::PackageMap;

/// Package name -> every package that depends on it, directly or not
pub type DependentTable = BTreeMap<String, BTreeSet<String>>;

/// Build the dependent closure of every package in `packages`
///
/// Dependencies on names outside the map are ignored. Each closure is a
/// breadth-first walk over first-level dependents with a visited set, so
/// dependency cycles terminate. A package never lists itself.
pub fn build_dependent_table(packages: &PackageMap) -> DependentTable {
    trace!(packages = packages.len(), "building dependent table");

    let mut first_level: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();

    for (name, package) in packages {
        let deps: Vec<&str> = package
            .manifest
            .all_dependencies()
            .filter(|dep| packages.contains_key(*dep))
            .collect();
        trace!(package = %name, dependencies = ?deps, "first level dependencies");

        for dep in deps {
            first_level.entry(dep).or_default().insert(name.as_str());
        }
    }

    let mut table = DependentTable::new();

    for name in packages.keys() {
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        let mut queue: VecDeque<&str> = VecDeque::from([name.as_str()]);

        while let Some(current) = queue.pop_front() {
            let Some(dependents) = first_level.get(current) else {
                continue;
            };
            for dependent in dependents {
                if seen.insert(*dependent) {
                    queue.push_back(*dependent);
                }
            }
        }

        seen.remove(name.as_str());
        trace!(package = %name, dependents = ?seen, "deep level dependents");

        table.insert(
            name.clone(),
            seen.into_iter().map(String::from).collect(),
        );
    }

    table
}
