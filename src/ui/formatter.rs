//! Pure formatting functions for UI output.
//!
//! The `format_*` functions build the lines, the `display_*` functions print
//! them. Styling goes through `console`, which drops colors when the output
//! is not a terminal.

use console::style;

use crate::domain::ReleaseType;
use crate::versioner::{BumpReport, CheckOutcome, PackageCheck, ValidationReport, VersionChange};

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// One line per validated package.
///
/// Passed packages show `from -> to`, skipped ones the reason.
pub fn format_check(check: &PackageCheck) -> String {
    match &check.outcome {
        CheckOutcome::Passed { from, to } => match from {
            Some(from) if from != to => format!(
                "  {} {} {} -> {}",
                style("✓").green(),
                check.name,
                style(from).dim(),
                style(to).green().bold()
            ),
            _ => format!("  {} {} {}", style("✓").green(), check.name, style(to).dim()),
        },
        CheckOutcome::Skipped(reason) => format!(
            "  {} {} {}",
            style("-").yellow(),
            check.name,
            style(format!("skipped, {}", reason)).dim()
        ),
    }
}

pub fn format_change(change: &VersionChange) -> String {
    format!(
        "  {} {} {} -> {}",
        style("↑").cyan(),
        change.name,
        style(&change.from).dim(),
        style(&change.to).green().bold()
    )
}

fn release_type_label(release_type: Option<ReleaseType>) -> String {
    release_type
        .map(|r| r.to_string())
        .unwrap_or_else(|| "none".to_string())
}

/// Print the per-package outcome of a validation and a summary line.
pub fn display_validation_report(report: &ValidationReport) {
    println!(
        "\n{} (release type: {})",
        style("Version validation").bold(),
        release_type_label(report.release_type)
    );
    for check in &report.checks {
        println!("{}", format_check(check));
    }
    display_success(&format!(
        "{} package(s) properly versioned, {} skipped",
        report.passed(),
        report.skipped()
    ));
}

/// Print the versions written by a bump.
pub fn display_bump_report(report: &BumpReport) {
    println!(
        "\n{} (release type: {})",
        style("Version bump").bold(),
        release_type_label(report.release_type)
    );

    if report.changes.is_empty() {
        display_status("No package needs a new version");
        return;
    }

    for change in &report.changes {
        println!("{}", format_change(change));
    }
    display_success(&format!("{} package(s) bumped", report.changes.len()));
}
