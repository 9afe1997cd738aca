//! Diagnostics setup
//!
//! The verbosity flags select a [LogLevel], which becomes the filter of a
//! subscriber installed for the duration of one command.

use tracing::subscriber::DefaultGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Quiet,
    #[default]
    Info,
    Debug,
    Verbose,
}

impl LogLevel {
    /// Level selected by the mutually exclusive verbosity flags
    pub fn from_flags(quiet: bool, debug: bool, verbose: bool) -> Self {
        if quiet {
            LogLevel::Quiet
        } else if verbose {
            LogLevel::Verbose
        } else if debug {
            LogLevel::Debug
        } else {
            LogLevel::Info
        }
    }

    pub fn filter_directive(self) -> &'static str {
        match self {
            LogLevel::Quiet => "off",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Verbose => "trace",
        }
    }
}

/// Install a stderr subscriber for `level` until the guard is dropped
///
/// `RUST_LOG` takes precedence over `level` when set.
pub fn init(level: LogLevel) -> DefaultGuard {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.filter_directive()));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_filter(filter),
        )
        .set_default()
}
