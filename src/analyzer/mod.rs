//! Analysis of the commit being versioned

pub mod commit_analyzer;

pub use commit_analyzer::CommitAnalyzer;
