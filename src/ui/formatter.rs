//! Pure formatting functions for report output.
//!
//! `format_*` functions build strings and are unit tested; `display_*`
//! functions print them.

use crate::domain::{AggregatedMetrics, ChangeType, TagMetrics};
use crate::pipeline::ProjectScan;
use console::style;
use std::collections::BTreeMap;

/// Releases listed per project before the rest is summarized
pub const MAX_LISTED_RELEASES: usize = 10;

/// `1234567` -> `1,234,567`
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// One line per release: version, tag date, then commits and churn for
/// deltas or a baseline marker for the oldest tag.
pub fn format_release_line(metrics: &TagMetrics) -> String {
    let date = metrics.tag.timestamp.format("%Y-%m-%d");
    match &metrics.previous_tag_name {
        Some(previous) => format!(
            "{:12} {} {:>4} commits  (+{} / -{} lines, {} files) since {}",
            metrics.tag.name,
            date,
            metrics.commit_count,
            format_count(metrics.lines_added),
            format_count(metrics.lines_removed),
            metrics.files_changed,
            previous
        ),
        None => format!("{:12} {} (baseline)", metrics.tag.name, date),
    }
}

/// `Added 3, Fixed 1`; empty map gives `none`
pub fn format_distribution(distribution: &BTreeMap<ChangeType, u64>) -> String {
    if distribution.is_empty() {
        return "none".to_string();
    }
    distribution
        .iter()
        .map(|(change_type, count)| format!("{} {}", change_type, count))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Print a warning line to stderr
pub fn display_warning(message: &str) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), message);
}

/// Display the release series of one project, newest first.
///
/// At most [MAX_LISTED_RELEASES] releases are listed.
pub fn display_project(scan: &ProjectScan) {
    println!("\n{}", style(format!("📦 {}", scan.name)).bold());
    println!("{}", "-".repeat(70));

    if scan.tag_metrics.is_empty() {
        println!("  {}", style("no releases").dim());
    }

    for metrics in scan.tag_metrics.iter().take(MAX_LISTED_RELEASES) {
        println!("  {}", format_release_line(metrics));
    }

    if scan.tag_metrics.len() > MAX_LISTED_RELEASES {
        println!(
            "  ... and {} more releases",
            scan.tag_metrics.len() - MAX_LISTED_RELEASES
        );
    }

    if scan.unreleased_commits > 0 {
        println!(
            "  {} {} unreleased commits",
            style("→").yellow(),
            scan.unreleased_commits
        );
    }
}

/// Display the per-project table and the cross-project totals
pub fn display_summary(metrics: &AggregatedMetrics) {
    let heading = format!("Summary for period {}", metrics.period);
    println!("\n{}", style(heading).bold().underlined());

    for project in &metrics.projects {
        println!(
            "  {:20} {:>4} releases {:>6} commits  +{} / -{} (net {:+})  {}",
            project.name,
            project.release_count,
            project.commit_count,
            format_count(project.lines_added),
            format_count(project.lines_removed),
            project.net_change(),
            format_distribution(&project.change_type_counts)
        );
    }

    println!();
    println!(
        "  {} {} releases, {} commits, {} lines added, {} lines removed",
        style("Total:").bold(),
        format_count(metrics.total_releases),
        format_count(metrics.total_commits),
        style(format_count(metrics.total_lines_added)).green(),
        style(format_count(metrics.total_lines_removed)).red()
    );
    println!(
        "  {} {}",
        style("Change types:").bold(),
        format_distribution(&metrics.change_type_distribution)
    );
}
