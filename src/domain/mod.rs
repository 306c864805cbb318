//! Domain types - pure data independent of git access

pub mod changelog;
pub mod metrics;
pub mod period;
pub mod tag;

pub use changelog::{ChangeType, ChangelogEntry, ChangelogRelease, ProjectChangelog};
pub use metrics::{AggregatedMetrics, LineDiff, ProjectMetrics, TagMetrics};
pub use period::Period;
pub use tag::{is_semantic_version, normalize_version, Tag};
