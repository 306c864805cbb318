//! Period-scoped folding of per-project metrics
//!
//! The aggregator is the only place that sees every project at once. It
//! never mutates its inputs: filtering works on borrowed slices and the
//! result is built fresh.

use crate::domain::{
    normalize_version, AggregatedMetrics, ChangeType, Period, ProjectChangelog, ProjectMetrics,
    TagMetrics,
};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Fold tag metrics and changelogs into a cross-project summary.
///
/// Projects are keyed by name. A project that appears only in `changelogs`
/// or only in `tag_metrics` is still reported; one with an empty series
/// reports zero metrics.
pub fn aggregate(
    changelogs: &[ProjectChangelog],
    tag_metrics: &BTreeMap<String, Vec<TagMetrics>>,
    period: &Period,
) -> AggregatedMetrics {
    let names: BTreeSet<&str> = tag_metrics
        .keys()
        .map(String::as_str)
        .chain(changelogs.iter().map(|c| c.project_name.as_str()))
        .collect();

    let projects: Vec<ProjectMetrics> = names
        .into_iter()
        .map(|name| {
            let series = tag_metrics.get(name).map(Vec::as_slice).unwrap_or_default();
            let project_changelogs: Vec<&ProjectChangelog> = changelogs
                .iter()
                .filter(|c| c.project_name == name)
                .collect();
            project_metrics(name, series, &project_changelogs, period)
        })
        .collect();

    combine(projects, period)
}

/// Metrics for one project restricted to `period`
pub fn project_metrics(
    name: &str,
    series: &[TagMetrics],
    changelogs: &[&ProjectChangelog],
    period: &Period,
) -> ProjectMetrics {
    let in_window: Vec<&TagMetrics> = series
        .iter()
        .filter(|m| period.contains(&m.tag.timestamp))
        .collect();

    let mut metrics = ProjectMetrics::empty(name);
    for record in &in_window {
        if record.is_delta() {
            metrics.release_count += 1;
        }
        metrics.commit_count += record.commit_count;
        metrics.lines_added += record.lines_added;
        metrics.lines_removed += record.lines_removed;
    }

    let tagged: HashSet<&str> = series.iter().map(|m| m.tag.version.as_str()).collect();
    let tagged_in_window: HashSet<&str> = in_window
        .iter()
        .map(|m| m.tag.version.as_str())
        .collect();

    for changelog in changelogs {
        for release in &changelog.releases {
            let version = normalize_version(&release.version);
            let counted = if tagged.contains(version) {
                tagged_in_window.contains(version)
            } else {
                match release.date {
                    Some(date) => period.contains_date(&date),
                    None => *period == Period::All,
                }
            };
            if !counted {
                continue;
            }

            for entry in &release.entries {
                *metrics.change_type_counts.entry(entry.change_type).or_insert(0) += 1;
            }
        }
    }

    metrics
}

/// Sum project metrics into the cross-project totals
pub fn combine(mut projects: Vec<ProjectMetrics>, period: &Period) -> AggregatedMetrics {
    projects.sort_by(|a, b| a.name.cmp(&b.name));

    let mut summary = AggregatedMetrics {
        period: period.to_string(),
        ..Default::default()
    };

    for project in &projects {
        summary.total_releases += project.release_count;
        summary.total_commits += project.commit_count;
        summary.total_lines_added += project.lines_added;
        summary.total_lines_removed += project.lines_removed;
        for (change_type, count) in &project.change_type_counts {
            *summary
                .change_type_distribution
                .entry(*change_type)
                .or_insert(0) += count;
        }
    }

    summary.projects = projects;
    summary
}

/// Total entries of one change type across all projects
pub fn change_type_total(metrics: &AggregatedMetrics, change_type: ChangeType) -> u64 {
    metrics
        .change_type_distribution
        .get(&change_type)
        .copied()
        .unwrap_or(0)
}
