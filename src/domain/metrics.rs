use super::changelog::ChangeType;
use super::tag::Tag;
use serde::Serialize;
use std::collections::BTreeMap;

/// Line-level churn between two refs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LineDiff {
    pub lines_added: u64,
    pub lines_removed: u64,
    pub files_changed: u64,
}

/// Commit and line metrics for one release tag.
///
/// `tag` is the newer end of the measured range and `previous_tag_name` the
/// older end. The oldest tag of a repository has no predecessor: it carries
/// zero metrics and marks the baseline rather than a delta.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagMetrics {
    pub tag: Tag,
    pub previous_tag_name: Option<String>,
    pub commit_count: u64,
    pub lines_added: u64,
    pub lines_removed: u64,
    pub files_changed: u64,
}

impl TagMetrics {
    /// Metrics for the range `previous..tag`
    pub fn delta(tag: Tag, previous: &Tag, commit_count: u64, diff: LineDiff) -> Self {
        TagMetrics {
            tag,
            previous_tag_name: Some(previous.name.clone()),
            commit_count,
            lines_added: diff.lines_added,
            lines_removed: diff.lines_removed,
            files_changed: diff.files_changed,
        }
    }

    /// Zero-metric record for a tag with no predecessor
    pub fn baseline(tag: Tag) -> Self {
        TagMetrics {
            tag,
            previous_tag_name: None,
            commit_count: 0,
            lines_added: 0,
            lines_removed: 0,
            files_changed: 0,
        }
    }

    pub fn is_delta(&self) -> bool {
        self.previous_tag_name.is_some()
    }
}

/// Folded metrics for one project within a period
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectMetrics {
    pub name: String,
    pub release_count: u64,
    pub commit_count: u64,
    pub lines_added: u64,
    pub lines_removed: u64,
    pub change_type_counts: BTreeMap<ChangeType, u64>,
}

impl ProjectMetrics {
    /// Zero metrics for a project whose data could not be collected
    pub fn empty(name: impl Into<String>) -> Self {
        ProjectMetrics {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn net_change(&self) -> i64 {
        self.lines_added as i64 - self.lines_removed as i64
    }
}

/// Cross-project summary for a period
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregatedMetrics {
    pub period: String,
    pub total_releases: u64,
    pub total_commits: u64,
    pub total_lines_added: u64,
    pub total_lines_removed: u64,
    pub projects: Vec<ProjectMetrics>,
    pub change_type_distribution: BTreeMap<ChangeType, u64>,
}
