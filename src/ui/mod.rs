//! User-facing output.
//!
//! Diagnostics go through `tracing`; this module prints the final outcome of
//! a command and the fatal error, if any.

pub mod formatter;

pub use formatter::{
    display_bump_report, display_error, display_status, display_success,
    display_validation_report,
};
