//! User interface module - report rendering.
//!
//! - `formatter` - Line formatting and styled printing
//! - This module - Whole-report output in console or JSON form

use crate::error::Result;
use crate::pipeline::MetricsReport;

pub mod formatter;

pub use formatter::{
    display_error, display_project, display_status, display_summary, display_warning,
    format_count, format_distribution, format_release_line,
};

/// Print the full report: every project, the summary, then all warnings.
///
/// Warnings go to stderr verbatim so stdout stays the report itself.
pub fn display_report(report: &MetricsReport) {
    println!("{}", "=".repeat(70));
    println!("Release metrics - {} projects", report.projects.len());
    println!("{}", "=".repeat(70));

    for scan in &report.projects {
        display_project(scan);
    }

    display_summary(&report.metrics);

    if !report.warnings.is_empty() {
        eprintln!();
        for warning in &report.warnings {
            display_warning(warning);
        }
    }
}

/// Serialize the report for machine consumption
pub fn report_json(report: &MetricsReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AggregatedMetrics, Period};
    use crate::pipeline::merge;

    #[test]
    fn test_report_json_shape() {
        let mut report = merge(Vec::new(), &Period::parse("2025-Q1").unwrap());
        report.warnings.push("svc: No semantic version tags found".to_string());

        let json = report_json(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["metrics"]["period"], "2025-Q1");
        assert_eq!(value["metrics"]["total_releases"], 0);
        assert_eq!(value["warnings"][0], "svc: No semantic version tags found");
        assert!(value["projects"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_display_report_empty() {
        let report = MetricsReport {
            metrics: AggregatedMetrics::default(),
            projects: Vec::new(),
            warnings: Vec::new(),
        };
        display_report(&report);
    }
}
