//! Validate and bump the versions of the packages of a monorepo.
//!
//! The release type comes from the conventional commit at HEAD. Packages
//! touched by the commit, and in independent mode every package depending
//! on them, must move to the next version; the others must keep the version
//! they have on the base branch.

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod logging;
pub mod ui;
pub mod versioner;
pub mod workspace;

pub use error::{MultiVersionError, Result};
