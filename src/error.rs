use std::path::{Path, PathBuf};

use thiserror::Error;

/// Boxed underlying cause carried by the error variants
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Unified error type for multi-version operations
///
/// Every variant is fatal to the running command. The optional `source`
/// keeps the underlying failure so the CLI can print the whole chain.
#[derive(Error, Debug)]
pub enum MultiVersionError {
    #[error("Invalid commit: {message}")]
    InvalidCommit {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Invalid version: {message}")]
    InvalidVersion {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Invalid version bump: {message}")]
    InvalidVersionBump {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Cannot read the file: {}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Cannot write the file: {}", path.display())]
    WriteFile {
        path: PathBuf,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),
}

/// Convenience type alias for Results in multi-version
pub type Result<T> = std::result::Result<T, MultiVersionError>;

impl MultiVersionError {
    /// Create a commit error with context
    pub fn invalid_commit(msg: impl Into<String>) -> Self {
        MultiVersionError::InvalidCommit {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a configuration error with context
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        MultiVersionError::InvalidConfig {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a version error with context
    pub fn invalid_version(msg: impl Into<String>) -> Self {
        MultiVersionError::InvalidVersion {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a version bump error with context
    pub fn invalid_version_bump(msg: impl Into<String>) -> Self {
        MultiVersionError::InvalidVersionBump {
            message: msg.into(),
            source: None,
        }
    }

    pub fn read_file(path: impl AsRef<Path>) -> Self {
        MultiVersionError::ReadFile {
            path: path.as_ref().to_path_buf(),
            source: None,
        }
    }

    pub fn write_file(path: impl AsRef<Path>) -> Self {
        MultiVersionError::WriteFile {
            path: path.as_ref().to_path_buf(),
            source: None,
        }
    }

    /// Attach an underlying cause to the error
    ///
    /// `Git` errors already wrap their cause and are returned unchanged.
    pub fn with_source(mut self, cause: impl Into<BoxError>) -> Self {
        match &mut self {
            MultiVersionError::InvalidCommit { source, .. }
            | MultiVersionError::InvalidConfig { source, .. }
            | MultiVersionError::InvalidVersion { source, .. }
            | MultiVersionError::InvalidVersionBump { source, .. }
            | MultiVersionError::ReadFile { source, .. }
            | MultiVersionError::WriteFile { source, .. } => *source = Some(cause.into()),
            MultiVersionError::Git(_) => {}
        }
        self
    }
}
