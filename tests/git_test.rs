// tests/git_test.rs
use std::fs;
use std::path::Path;

use git2::{Commit, Oid, Repository, RepositoryInitOptions, Signature};
use multi_version::git::{Git2Repository, VersionControl};
use tempfile::TempDir;

fn init_repo(dir: &Path) -> Repository {
    let mut options = RepositoryInitOptions::new();
    options.initial_head("main");
    Repository::init_opts(dir, &options).unwrap()
}

fn commit_files(repo: &Repository, files: &[(&str, &str)], message: &str) -> Oid {
    let workdir = repo.workdir().unwrap().to_path_buf();
    let mut index = repo.index().unwrap();

    for (path, content) in files {
        let full = workdir.join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(&full, content).unwrap();
        index.add_path(Path::new(path)).unwrap();
    }
    index.write().unwrap();

    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let signature = Signature::now("Test Author", "test@example.com").unwrap();
    let parents: Vec<Commit> = match repo.head() {
        Ok(head) => vec![head.peel_to_commit().unwrap()],
        Err(_) => Vec::new(),
    };
    let parent_refs: Vec<&Commit> = parents.iter().collect();

    repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parent_refs)
        .unwrap()
}

fn sorted(mut files: Vec<String>) -> Vec<String> {
    files.sort();
    files
}

#[test]
fn test_head_commit() {
    let dir = TempDir::new().unwrap();
    let repo = init_repo(dir.path());
    commit_files(&repo, &[("package.json", "{}")], "feat: initial commit\n\nbody");

    let git = Git2Repository::open(dir.path()).unwrap();
    let head = git.head_commit().unwrap();

    assert_eq!(head.message, "feat: initial commit\n\nbody");
    assert_eq!(head.author, "Test Author");
    assert!(head.hash.len() >= 7);
    assert_eq!(git.current_ref().unwrap(), "main");
}

#[test]
fn test_changed_files_of_commit() {
    let dir = TempDir::new().unwrap();
    let repo = init_repo(dir.path());
    commit_files(
        &repo,
        &[
            ("package.json", "{}"),
            ("packages/a/package.json", "{}"),
        ],
        "chore: init",
    );
    commit_files(
        &repo,
        &[("packages/b/src/index.ts", "export {}")],
        "feat(b): add b",
    );

    let git = Git2Repository::open(dir.path()).unwrap();
    assert_eq!(
        git.changed_files("HEAD").unwrap(),
        vec!["packages/b/src/index.ts"]
    );
    assert_eq!(
        sorted(git.changed_files("HEAD~1").unwrap()),
        vec!["package.json", "packages/a/package.json"]
    );
}

#[test]
fn test_changed_files_since_base_branch() {
    let dir = TempDir::new().unwrap();
    let repo = init_repo(dir.path());
    let base = commit_files(&repo, &[("packages/a/index.js", "1")], "chore: init");

    let base_commit = repo.find_commit(base).unwrap();
    repo.branch("feature", &base_commit, false).unwrap();
    repo.set_head("refs/heads/feature").unwrap();
    commit_files(&repo, &[("packages/a/index.js", "2")], "fix(a): one");
    commit_files(&repo, &[("packages/c/index.js", "1")], "feat(c): two");

    let git = Git2Repository::open(dir.path()).unwrap();
    assert_eq!(
        sorted(git.changed_files_since("origin/main").unwrap()),
        vec!["packages/a/index.js", "packages/c/index.js"]
    );
    assert!(git.changed_files_since("missing").is_err());
}

#[test]
fn test_checkout_branch_and_back() {
    let dir = TempDir::new().unwrap();
    let repo = init_repo(dir.path());
    let base = commit_files(&repo, &[("packages/a/package.json", "{\"version\": \"1.0.0\"}")], "chore: init");

    repo.branch("feature", &repo.find_commit(base).unwrap(), false)
        .unwrap();
    repo.set_head("refs/heads/feature").unwrap();
    commit_files(
        &repo,
        &[("packages/a/package.json", "{\"version\": \"1.1.0\"}")],
        "feat(a): bump",
    );

    let git = Git2Repository::open(dir.path()).unwrap();
    git.checkout("origin/main").unwrap();
    assert_eq!(git.current_ref().unwrap(), "main");
    assert_eq!(
        fs::read_to_string(dir.path().join("packages/a/package.json")).unwrap(),
        "{\"version\": \"1.0.0\"}"
    );

    git.checkout("feature").unwrap();
    assert_eq!(git.current_ref().unwrap(), "feature");
    assert_eq!(
        fs::read_to_string(dir.path().join("packages/a/package.json")).unwrap(),
        "{\"version\": \"1.1.0\"}"
    );

    // Already there
    git.checkout("feature").unwrap();
}

#[test]
fn test_checkout_creates_branch_from_remote_tracking() {
    let dir = TempDir::new().unwrap();
    let repo = init_repo(dir.path());
    let oid = commit_files(&repo, &[("README.md", "hi")], "chore: init");
    repo.reference("refs/remotes/origin/release", oid, true, "test")
        .unwrap();

    let git = Git2Repository::open(dir.path()).unwrap();
    git.checkout("release").unwrap();

    assert_eq!(git.current_ref().unwrap(), "release");
    assert!(repo
        .find_branch("release", git2::BranchType::Local)
        .is_ok());
}

#[test]
fn test_checkout_detached_commit() {
    let dir = TempDir::new().unwrap();
    let repo = init_repo(dir.path());
    let first = commit_files(&repo, &[("a.txt", "1")], "chore: one");
    commit_files(&repo, &[("a.txt", "2")], "chore: two");

    let git = Git2Repository::open(dir.path()).unwrap();
    git.checkout(&first.to_string()).unwrap();

    assert_eq!(git.current_ref().unwrap(), first.to_string());
    assert_eq!(fs::read_to_string(dir.path().join("a.txt")).unwrap(), "1");
}

#[test]
fn test_pull_fast_forwards_checked_out_branch() {
    let origin_dir = TempDir::new().unwrap();
    let origin = init_repo(origin_dir.path());
    commit_files(&origin, &[("packages/a/package.json", "1")], "chore: init");

    let clone_dir = TempDir::new().unwrap();
    Repository::clone(origin_dir.path().to_str().unwrap(), clone_dir.path()).unwrap();

    commit_files(&origin, &[("packages/a/package.json", "2")], "fix(a): upstream");

    let git = Git2Repository::open(clone_dir.path()).unwrap();
    git.pull("origin", "main").unwrap();

    assert_eq!(git.head_commit().unwrap().message, "fix(a): upstream");
    assert_eq!(
        fs::read_to_string(clone_dir.path().join("packages/a/package.json")).unwrap(),
        "2"
    );

    // Nothing new upstream
    git.pull("origin", "main").unwrap();
}
