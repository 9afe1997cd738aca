// tests/versioner_test.rs
use multi_version::config::Config;
use multi_version::domain::PackageManifest;
use multi_version::git::MockRepository;
use multi_version::versioner::{CheckOutcome, SkipReason, Stage, Versioner};
use multi_version::workspace::InMemoryWorkspace;
use multi_version::MultiVersionError;

/// common <- app, common <- lib <- app-3, app-2 on its own
fn inventory(versions: [&str; 5]) -> Vec<PackageManifest> {
    let [common, app, lib, app_3, app_2] = versions;
    vec![
        PackageManifest::new("common", common, "packages/common"),
        PackageManifest::new("app", app, "./packages/app/").with_dependencies(["common", "react"]),
        PackageManifest::new("lib", lib, "packages/lib").with_dev_dependencies(["common"]),
        PackageManifest::new("app-3", app_3, "packages/app-3").with_dependencies(["lib"]),
        PackageManifest::new("app-2", app_2, "packages/app-2"),
    ]
}

fn original() -> Vec<PackageManifest> {
    inventory(["1.0.0", "2.0.0", "3.0.0", "0.1.0", "0.5.0"])
}

fn feature_commit() -> MockRepository {
    MockRepository::new()
        .on_branch("feature/login")
        .with_commit("feat(common): add helper")
        .with_changed_files(["packages/common/src/index.ts"])
}

fn synced_config() -> Config {
    let mut config = Config::default();
    config.versioning.sync_mode = true;
    config
}

#[test]
fn test_independent_changed_package_and_dependents_pass() {
    let repo = feature_commit();
    let workspace =
        InMemoryWorkspace::new(inventory(["1.1.0", "2.1.0", "3.1.0", "0.2.0", "0.5.0"]))
            .then_load(original());

    let mut versioner = Versioner::new(Config::default(), &repo, &workspace);
    let report = versioner.validate().unwrap();

    assert_eq!(report.passed(), 5);
    assert_eq!(
        report.outcome("common"),
        Some(&CheckOutcome::Passed {
            from: Some("1.0.0".to_string()),
            to: "1.1.0".to_string()
        })
    );
    assert_eq!(
        report.outcome("app-2"),
        Some(&CheckOutcome::Passed {
            from: Some("0.5.0".to_string()),
            to: "0.5.0".to_string()
        })
    );
    assert_eq!(versioner.stage(), Stage::Reconciled);

    let packages = versioner.packages();
    for name in ["common", "app", "lib", "app-3"] {
        assert!(packages[name].should_be_updated, "{} should be marked", name);
    }
    assert!(!packages["app-2"].should_be_updated);
}

#[test]
fn test_independent_unrelated_package_bump_fails() {
    let repo = feature_commit();
    let workspace =
        InMemoryWorkspace::new(inventory(["1.1.0", "2.1.0", "3.1.0", "0.2.0", "0.6.0"]))
            .then_load(original());

    let err = Versioner::new(Config::default(), &repo, &workspace)
        .validate()
        .unwrap_err();

    assert!(matches!(err, MultiVersionError::InvalidVersionBump { .. }));
    let message = err.to_string();
    assert!(message.contains("0.6.0"));
    assert!(message.contains("0.5.0"));
    assert!(message.contains("app-2"));
}

#[test]
fn test_independent_missing_dependent_bump_fails() {
    let repo = feature_commit();
    // app-3 depends on common only through lib
    let workspace =
        InMemoryWorkspace::new(inventory(["1.1.0", "2.1.0", "3.1.0", "0.1.0", "0.5.0"]))
            .then_load(original());

    let err = Versioner::new(Config::default(), &repo, &workspace)
        .validate()
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid version bump: Commited version 0.1.0 does not match expected 0.2.0 for release type minor: app-3"
    );
}

#[test]
fn test_validate_restores_original_branch() {
    let repo = feature_commit();
    let workspace =
        InMemoryWorkspace::new(inventory(["1.1.0", "2.1.0", "3.1.0", "0.2.0", "0.5.0"]))
            .then_load(original());

    Versioner::new(Config::default(), &repo, &workspace)
        .validate()
        .unwrap();

    assert_eq!(repo.checkouts(), vec!["main", "feature/login"]);
    assert_eq!(repo.pulls(), vec![("origin".to_string(), "main".to_string())]);
}

#[test]
fn test_validate_restores_branch_on_failure() {
    let repo = feature_commit();
    let workspace =
        InMemoryWorkspace::new(inventory(["1.1.0", "2.1.0", "3.1.0", "0.2.0", "0.6.0"]))
            .then_load(original());

    assert!(Versioner::new(Config::default(), &repo, &workspace)
        .validate()
        .is_err());
    assert_eq!(repo.checkouts(), vec!["main", "feature/login"]);
}

#[test]
fn test_added_and_removed_packages_are_skipped() {
    let repo = feature_commit();
    let mut current = inventory(["1.1.0", "2.1.0", "3.1.0", "0.2.0", "0.5.0"]);
    current.push(PackageManifest::new("fresh", "0.0.1", "packages/fresh"));
    let mut base = original();
    base.push(PackageManifest::new("legacy", "4.0.0", "packages/legacy"));

    let workspace = InMemoryWorkspace::new(current).then_load(base);
    let report = Versioner::new(Config::default(), &repo, &workspace)
        .validate()
        .unwrap();

    assert_eq!(
        report.outcome("fresh"),
        Some(&CheckOutcome::Skipped(SkipReason::Added))
    );
    assert_eq!(
        report.outcome("legacy"),
        Some(&CheckOutcome::Skipped(SkipReason::Removed))
    );
    assert_eq!(report.skipped(), 2);
}

#[test]
fn test_package_without_version_counts_as_removed() {
    let repo = feature_commit();
    let mut current = inventory(["1.1.0", "2.1.0", "3.1.0", "0.2.0", "0.5.0"]);
    current.push(PackageManifest {
        name: "docs".to_string(),
        version: None,
        relative_dir: "docs".to_string(),
        ..PackageManifest::default()
    });

    let workspace = InMemoryWorkspace::new(current).then_load(original());
    let report = Versioner::new(Config::default(), &repo, &workspace)
        .validate()
        .unwrap();

    assert_eq!(
        report.outcome("docs"),
        Some(&CheckOutcome::Skipped(SkipReason::Removed))
    );
}

#[test]
fn test_no_release_commit_keeps_versions() {
    let repo = MockRepository::new()
        .with_commit("docs(common): typo")
        .with_changed_files(["packages/common/README.md"]);
    let workspace = InMemoryWorkspace::new(original()).then_load(original());
    let mut config = Config::default();
    config.conventional_commits.no_release_types = vec!["docs".to_string()];

    let report = Versioner::new(config, &repo, &workspace).validate().unwrap();
    assert_eq!(report.release_type, None);
    assert_eq!(report.passed(), 5);
}

#[test]
fn test_synced_all_packages_match_reference() {
    let repo = feature_commit();
    let workspace =
        InMemoryWorkspace::new(inventory(["1.1.0", "1.1.0", "1.1.0", "1.1.0", "1.1.0"]))
            .then_load(inventory(["1.0.0", "1.0.0", "1.0.0", "1.0.0", "1.0.0"]));

    let mut versioner = Versioner::new(synced_config(), &repo, &workspace);
    let report = versioner.validate().unwrap();

    assert_eq!(report.passed(), 5);
    assert_eq!(versioner.synced_version(), Some("1.1.0"));
    assert!(versioner.packages().values().all(|p| p.should_be_updated));
}

#[test]
fn test_synced_package_off_target_fails() {
    let repo = feature_commit();
    let workspace =
        InMemoryWorkspace::new(inventory(["1.1.0", "1.1.0", "1.1.0", "1.1.0", "1.0.0"]))
            .then_load(inventory(["1.0.0", "1.0.0", "1.0.0", "1.0.0", "1.0.0"]));

    let err = Versioner::new(synced_config(), &repo, &workspace)
        .validate()
        .unwrap_err();
    assert!(matches!(err, MultiVersionError::InvalidVersionBump { .. }));
    assert!(err.to_string().contains("app-2"));
}

#[test]
fn test_synced_reference_is_first_name() {
    let repo = feature_commit();
    // "app" sorts first, so its version is the target
    let workspace =
        InMemoryWorkspace::new(inventory(["1.3.0", "2.0.0", "1.3.0", "1.3.0", "1.3.0"]))
            .then_load(original());

    let err = Versioner::new(synced_config(), &repo, &workspace)
        .validate()
        .unwrap_err();
    assert!(err
        .to_string()
        .contains("Commited version 1.3.0 does not match expected 2.0.0"));
}

#[test]
fn test_synced_configured_reference() {
    let repo = feature_commit();
    let workspace =
        InMemoryWorkspace::new(inventory(["1.3.0", "1.3.0", "1.3.0", "1.3.0", "1.3.0"]))
            .then_load(original());
    let mut config = synced_config();
    config.versioning.sync_reference = Some("common".to_string());

    let mut versioner = Versioner::new(config, &repo, &workspace);
    assert!(versioner.validate().is_ok());
    assert_eq!(versioner.synced_version(), Some("1.3.0"));
}

#[test]
fn test_synced_added_package_must_match() {
    let repo = feature_commit();
    let mut current = inventory(["1.1.0", "1.1.0", "1.1.0", "1.1.0", "1.1.0"]);
    current.push(PackageManifest::new("fresh", "0.0.1", "packages/fresh"));

    let workspace = InMemoryWorkspace::new(current)
        .then_load(inventory(["1.0.0", "1.0.0", "1.0.0", "1.0.0", "1.0.0"]));

    let err = Versioner::new(synced_config(), &repo, &workspace)
        .validate()
        .unwrap_err();
    assert!(err.to_string().contains("fresh"));
}

#[test]
fn test_synced_missing_reference_version_fails() {
    let repo = feature_commit();
    let current = vec![
        PackageManifest {
            name: "app".to_string(),
            version: None,
            relative_dir: "packages/app".to_string(),
            ..PackageManifest::default()
        },
        PackageManifest::new("lib", "1.1.0", "packages/lib"),
    ];
    let workspace = InMemoryWorkspace::new(current).then_load(vec![
        PackageManifest::new("app", "1.0.0", "packages/app"),
        PackageManifest::new("lib", "1.0.0", "packages/lib"),
    ]);

    let err = Versioner::new(synced_config(), &repo, &workspace)
        .validate()
        .unwrap_err();
    assert!(matches!(err, MultiVersionError::InvalidVersionBump { .. }));
    assert!(err
        .to_string()
        .contains("Expected version is null (Synced mode ON)"));
}

#[test]
fn test_empty_base_branch_is_invalid_config() {
    let repo = feature_commit();
    let workspace = InMemoryWorkspace::new(original());
    let mut config = Config::default();
    config.versioning.base_branch = String::new();

    let err = Versioner::new(config, &repo, &workspace)
        .validate()
        .unwrap_err();
    assert!(matches!(err, MultiVersionError::InvalidConfig { .. }));
    assert!(repo.checkouts().is_empty());
}

#[test]
fn test_unknown_changed_files_is_invalid_commit() {
    let repo = MockRepository::new()
        .with_commit("fix: x")
        .without_commit_diff();
    let workspace = InMemoryWorkspace::new(original());

    let err = Versioner::new(Config::default(), &repo, &workspace)
        .validate()
        .unwrap_err();
    assert!(matches!(err, MultiVersionError::InvalidCommit { .. }));
}

#[test]
fn test_bump_independent_writes_marked_packages() {
    let repo = feature_commit();
    let workspace = InMemoryWorkspace::new(original());

    let report = Versioner::new(Config::default(), &repo, &workspace)
        .bump()
        .unwrap();

    assert_eq!(report.version_of("common"), Some("1.1.0"));
    assert_eq!(report.version_of("app"), Some("2.1.0"));
    assert_eq!(report.version_of("lib"), Some("3.1.0"));
    assert_eq!(report.version_of("app-3"), Some("0.2.0"));
    assert_eq!(report.version_of("app-2"), None);

    let mut writes = workspace.writes();
    writes.sort();
    assert_eq!(
        writes,
        vec![
            ("app".to_string(), "2.1.0".to_string()),
            ("app-3".to_string(), "0.2.0".to_string()),
            ("common".to_string(), "1.1.0".to_string()),
            ("lib".to_string(), "3.1.0".to_string()),
        ]
    );
    assert!(repo.checkouts().is_empty());
}

#[test]
fn test_bump_synced_moves_every_package_to_one_version() {
    let repo = MockRepository::new()
        .with_commit("fix(app-2)!: drop legacy flag")
        .with_changed_files(["packages/app-2/index.ts"]);
    let workspace =
        InMemoryWorkspace::new(inventory(["1.0.0", "1.2.0", "1.2.0", "1.1.0", "1.2.0"]));

    let report = Versioner::new(synced_config(), &repo, &workspace)
        .bump()
        .unwrap();

    assert_eq!(report.changes.len(), 5);
    assert!(report.changes.iter().all(|c| c.to == "2.0.0"));
}

#[test]
fn test_bump_skips_packages_already_at_target() {
    let repo = MockRepository::new()
        .with_commit("docs: typo")
        .with_changed_files(["packages/common/README.md"]);
    let workspace = InMemoryWorkspace::new(original());
    let mut config = Config::default();
    config.conventional_commits.no_release_types = vec!["docs".to_string()];

    let report = Versioner::new(config, &repo, &workspace).bump().unwrap();
    assert!(report.changes.is_empty());
    assert!(workspace.writes().is_empty());
}

fn single_package_commit() -> MockRepository {
    MockRepository::new()
        .with_commit("feat: add export")
        .with_changed_files(["src/index.js"])
}

#[test]
fn test_bump_single_package_repository() {
    let repo = single_package_commit();
    let workspace = InMemoryWorkspace::new(vec![PackageManifest::new("solo", "1.0.0", ".")]);

    let mut versioner = Versioner::new(Config::default(), &repo, &workspace);
    let report = versioner.bump().unwrap();

    assert!(versioner.packages()["solo"].should_be_updated);
    assert_eq!(report.version_of("solo"), Some("1.1.0"));
    assert_eq!(
        workspace.writes(),
        vec![("solo".to_string(), "1.1.0".to_string())]
    );
}

#[test]
fn test_validate_single_package_repository() {
    let repo = single_package_commit();
    let workspace = InMemoryWorkspace::new(vec![PackageManifest::new("solo", "1.1.0", ".")])
        .then_load(vec![PackageManifest::new("solo", "1.0.0", ".")]);

    let report = Versioner::new(Config::default(), &repo, &workspace)
        .validate()
        .unwrap();

    assert_eq!(
        report.outcome("solo"),
        Some(&CheckOutcome::Passed {
            from: Some("1.0.0".to_string()),
            to: "1.1.0".to_string()
        })
    );
}

#[test]
fn test_single_package_root_files_only_keep_version() {
    let repo = MockRepository::new()
        .with_commit("feat: tweak readme")
        .with_changed_files(["README.md"]);
    let workspace = InMemoryWorkspace::new(vec![PackageManifest::new("solo", "1.0.0", ".")]);

    let report = Versioner::new(Config::default(), &repo, &workspace)
        .bump()
        .unwrap();
    assert!(report.changes.is_empty());
}
