//! CLI definition and command handling

pub mod orchestration;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::logging::{self, LogLevel};
use crate::ui;
use orchestration::{run_workflow, Workflow, WorkflowArgs, WorkflowResult};

/// Validate and bump package versions of a monorepo from the last commit
#[derive(Debug, Parser)]
#[command(name = "multi-version")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Write the next version of every package touched by the commit
    Bump(CommandArgs),

    /// Check that the committed versions match the commit's release type
    Validate(CommandArgs),
}

/// Options shared by every command
#[derive(Debug, Clone, Default, Args)]
pub struct CommandArgs {
    /// Only print errors
    #[arg(short, long, conflicts_with_all = ["debug", "verbose"])]
    pub quiet: bool,

    /// Print debug diagnostics
    #[arg(short, long, conflicts_with = "verbose")]
    pub debug: bool,

    /// Print every diagnostic
    #[arg(short, long)]
    pub verbose: bool,

    /// Branch holding the released versions [default: main]
    #[arg(short, long)]
    pub base_branch: Option<String>,

    /// Move every package to one shared version
    #[arg(short, long)]
    pub sync_mode: bool,

    /// Custom configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl CommandArgs {
    pub fn log_level(&self) -> LogLevel {
        LogLevel::from_flags(self.quiet, self.debug, self.verbose)
    }

    fn workflow_args(&self) -> WorkflowArgs {
        WorkflowArgs {
            config_path: self.config.clone(),
            base_branch: self.base_branch.clone(),
            sync_mode: self.sync_mode,
        }
    }
}

impl Cli {
    /// Execute the CLI command in the current directory
    pub fn execute(self) -> anyhow::Result<()> {
        let (workflow, args) = match &self.command {
            Commands::Bump(args) => (Workflow::Bump, args),
            Commands::Validate(args) => (Workflow::Validate, args),
        };

        let _logging = logging::init(args.log_level());
        let cwd = std::env::current_dir()?;
        let result = run_workflow(workflow, &args.workflow_args(), &cwd)?;

        if !args.quiet {
            match &result {
                WorkflowResult::Validated(report) => ui::display_validation_report(report),
                WorkflowResult::Bumped(report) => ui::display_bump_report(report),
            }
        }

        Ok(())
    }
}
