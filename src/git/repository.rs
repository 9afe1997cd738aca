use crate::error::{MultiVersionError, Result};
use crate::git::{CommitInfo, VersionControl};
use git2::build::CheckoutBuilder;
use git2::{BranchType, Oid, Repository as Git2Repo, Tree};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, trace};

/// Wrapper around git2::Repository with our trait interface
///
/// `git2::Repository` is not `Sync`, so access goes through a mutex.
pub struct Git2Repository {
    repo: Mutex<Git2Repo>,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository {
            repo: Mutex::new(repo),
        })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository {
            repo: Mutex::new(repo),
        }
    }

    /// Root of the working tree, `None` for a bare repository
    pub fn workdir(&self) -> Result<Option<PathBuf>> {
        Ok(self.lock()?.workdir().map(Path::to_path_buf))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Git2Repo>> {
        self.repo
            .lock()
            .map_err(|_| MultiVersionError::Git(git2::Error::from_str("repository lock poisoned")))
    }
}

/// Repository-root-relative paths touched between two trees
fn diff_paths(repo: &Git2Repo, old: Option<&Tree<'_>>, new: &Tree<'_>) -> Result<Vec<String>> {
    let diff = repo.diff_tree_to_tree(old, Some(new), None)?;

    let paths = diff
        .deltas()
        .filter_map(|delta| {
            delta
                .new_file()
                .path()
                .or_else(|| delta.old_file().path())
                .map(|p| p.to_string_lossy().replace('\\', "/"))
        })
        .collect();

    Ok(paths)
}

/// Commit id of a local branch, or of `origin/<branch>` when there is none
fn branch_oid(repo: &Git2Repo, branch: &str) -> Result<Oid> {
    if let Ok(local) = repo.find_branch(branch, BranchType::Local) {
        return Ok(local.get().peel_to_commit()?.id());
    }

    let remote = repo
        .find_reference(&format!("refs/remotes/origin/{}", branch))
        .map_err(|e| {
            MultiVersionError::invalid_config(format!("Cannot find base branch '{}'", branch))
                .with_source(e)
        })?;

    Ok(remote.peel_to_commit()?.id())
}

fn current_ref(repo: &Git2Repo) -> Result<String> {
    let head = repo.head()?;

    if head.is_branch() {
        if let Some(name) = head.shorthand() {
            return Ok(name.to_string());
        }
    }

    let oid = head
        .target()
        .ok_or_else(|| git2::Error::from_str("HEAD is detached or invalid"))?;
    Ok(oid.to_string())
}

/// Updates a local branch to match its remote counterpart via fast-forward.
///
/// Similar to `git pull --ff-only`. When the branch is checked out, the
/// working tree is moved first so it matches the new branch tip.
fn fast_forward(repo: &Git2Repo, branch_name: &str, remote_name: &str) -> Result<()> {
    let remote_tracking_branch_name = format!("{}/{}", remote_name, branch_name);
    let remote_ref = match repo.find_reference(&format!("refs/remotes/{}", remote_tracking_branch_name)) {
        Ok(r) => r,
        // Remote branch doesn't exist, nothing to update
        Err(_) => return Ok(()),
    };

    let remote_oid = remote_ref.target().ok_or_else(|| {
        git2::Error::from_str(&format!(
            "Remote {} reference is invalid",
            remote_tracking_branch_name
        ))
    })?;

    let local_branch = match repo.find_branch(branch_name, BranchType::Local) {
        Ok(b) => b,
        Err(_) => {
            let remote_commit = repo.find_commit(remote_oid)?;
            repo.branch(branch_name, &remote_commit, false)?;
            return Ok(());
        }
    };

    let is_head = local_branch.is_head();
    let mut local_ref = local_branch.into_reference();
    let Some(local_oid) = local_ref.target() else {
        return Ok(());
    };

    if local_oid == remote_oid {
        trace!(branch = branch_name, "already up to date");
        return Ok(());
    }

    if !repo.graph_descendant_of(remote_oid, local_oid)? {
        return Err(MultiVersionError::Git(git2::Error::from_str(&format!(
            "Cannot fast-forward '{}' to '{}': branches have diverged",
            branch_name, remote_tracking_branch_name
        ))));
    }

    if is_head {
        let remote_commit = repo.find_commit(remote_oid)?;
        let mut builder = CheckoutBuilder::new();
        builder.safe();
        repo.checkout_tree(remote_commit.as_object(), Some(&mut builder))?;
    }

    local_ref.set_target(
        remote_oid,
        &format!("fast-forward from {}", remote_tracking_branch_name),
    )?;
    debug!(branch = branch_name, to = %remote_oid, "fast-forwarded");

    Ok(())
}

impl VersionControl for Git2Repository {
    fn head_commit(&self) -> Result<CommitInfo> {
        let repo = self.lock()?;
        let commit = repo.head()?.peel_to_commit()?;

        let short = commit.as_object().short_id()?;
        let hash = short
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| commit.id().to_string());

        let message = commit.message().unwrap_or("").to_string();
        let signature = commit.author();
        let author = signature.name().unwrap_or("unknown").to_string();

        Ok(CommitInfo {
            hash,
            message,
            author,
        })
    }

    fn current_ref(&self) -> Result<String> {
        let repo = self.lock()?;
        current_ref(&repo)
    }

    fn changed_files(&self, rev: &str) -> Result<Vec<String>> {
        let repo = self.lock()?;
        let commit = repo.revparse_single(rev)?.peel_to_commit()?;
        let tree = commit.tree()?;

        let parent_tree = if commit.parent_count() > 0 {
            Some(commit.parent(0)?.tree()?)
        } else {
            None
        };

        let paths = diff_paths(&repo, parent_tree.as_ref(), &tree);
        paths
    }

    fn changed_files_since(&self, base_branch: &str) -> Result<Vec<String>> {
        let repo = self.lock()?;
        let base = base_branch.strip_prefix("origin/").unwrap_or(base_branch);

        let base_oid = branch_oid(&repo, base)?;
        let head = repo.head()?.peel_to_commit()?;
        let merge_base = repo.merge_base(base_oid, head.id())?;
        let base_tree = repo.find_commit(merge_base)?.tree()?;

        let head_tree = head.tree()?;

        let paths = diff_paths(&repo, Some(&base_tree), &head_tree);
        paths
    }

    fn checkout(&self, rev: &str) -> Result<()> {
        let repo = self.lock()?;
        let rev = rev.strip_prefix("origin/").unwrap_or(rev);

        if current_ref(&repo).ok().as_deref() == Some(rev) {
            return Ok(());
        }

        let local = match repo.find_branch(rev, BranchType::Local) {
            Ok(branch) => Some(branch),
            Err(_) => match repo.find_reference(&format!("refs/remotes/origin/{}", rev)) {
                Ok(remote_ref) => {
                    let commit = remote_ref.peel_to_commit()?;
                    Some(repo.branch(rev, &commit, false)?)
                }
                Err(_) => None,
            },
        };

        let mut builder = CheckoutBuilder::new();
        builder.safe();

        match local {
            Some(branch) => {
                let reference = branch.into_reference();
                let refname = reference
                    .name()
                    .ok_or_else(|| git2::Error::from_str("branch name is not valid UTF-8"))?
                    .to_string();
                let commit = reference.peel_to_commit()?;

                repo.checkout_tree(commit.as_object(), Some(&mut builder))?;
                repo.set_head(&refname)?;
            }
            None => {
                let commit = repo.revparse_single(rev)?.peel_to_commit()?;

                repo.checkout_tree(commit.as_object(), Some(&mut builder))?;
                repo.set_head_detached(commit.id())?;
            }
        }

        debug!(rev, "checked out");
        Ok(())
    }

    fn pull(&self, remote_name: &str, branch: &str) -> Result<()> {
        let repo = self.lock()?;
        let branch = branch.strip_prefix("origin/").unwrap_or(branch);

        let mut remote = repo.find_remote(remote_name)?;

        let mut callbacks = git2::RemoteCallbacks::new();
        callbacks.credentials(|_url, username_from_url, allowed_types| {
            let username = username_from_url.unwrap_or("git");

            if allowed_types.contains(git2::CredentialType::SSH_KEY) {
                if let Ok(cred) = git2::Cred::ssh_key_from_agent(username) {
                    return Ok(cred);
                }

                if let Some(home) = dirs::home_dir() {
                    for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                        let path = home.join(".ssh").join(key);
                        if path.exists() {
                            if let Ok(cred) = git2::Cred::ssh_key(username, None, &path, None) {
                                return Ok(cred);
                            }
                        }
                    }
                }
            }

            git2::Cred::default()
        });

        let mut fetch_options = git2::FetchOptions::new();
        fetch_options.remote_callbacks(callbacks);

        let refspec = format!(
            "+refs/heads/{branch}:refs/remotes/{remote}/{branch}",
            branch = branch,
            remote = remote_name
        );
        remote.fetch(&[refspec.as_str()], Some(&mut fetch_options), None)?;
        debug!(remote = remote_name, branch, "fetched");

        fast_forward(&repo, branch, remote_name)
    }
}
