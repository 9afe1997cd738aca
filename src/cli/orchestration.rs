//! Command workflows
//!
//! Keeps the bump and validate flows apart from clap so they can be driven
//! programmatically.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::config::{load_config, Config};
use crate::error::MultiVersionError;
use crate::git::Git2Repository;
use crate::versioner::{BumpReport, ValidationReport, Versioner};
use crate::workspace::NpmWorkspace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workflow {
    Bump,
    Validate,
}

/// Overrides given on the command line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowArgs {
    pub config_path: Option<PathBuf>,
    pub base_branch: Option<String>,
    /// Forces synced mode on; `false` keeps the configured value
    pub sync_mode: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowResult {
    Validated(ValidationReport),
    Bumped(BumpReport),
}

/// Load the configuration for `root` and apply the command line overrides
pub fn resolve_config(args: &WorkflowArgs, root: &Path) -> crate::Result<Config> {
    let mut config = load_config(args.config_path.as_deref(), root)?;

    if let Some(base_branch) = &args.base_branch {
        config.versioning.base_branch = base_branch.clone();
    }
    if args.sync_mode {
        config.versioning.sync_mode = true;
    }

    config.validate()?;
    Ok(config)
}

/// Run `workflow` for the repository containing `cwd`
pub fn run_workflow(workflow: Workflow, args: &WorkflowArgs, cwd: &Path) -> Result<WorkflowResult> {
    let repo = Git2Repository::open(cwd).context("Not inside a git repository")?;
    let root = repo.workdir()?.ok_or_else(|| {
        MultiVersionError::invalid_config("A working tree is required, the repository is bare")
    })?;
    let root = root.canonicalize().unwrap_or(root);
    debug!(root = %root.display(), ?workflow, "running");

    let config = resolve_config(args, &root)?;
    let workspace = NpmWorkspace::new(&root);
    let mut versioner = Versioner::new(config, &repo, &workspace);

    let result = match workflow {
        Workflow::Bump => WorkflowResult::Bumped(versioner.bump()?),
        Workflow::Validate => WorkflowResult::Validated(versioner.validate()?),
    };

    Ok(result)
}
