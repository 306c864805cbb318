use crate::error::{MetricsError, Result};
use crate::diff::parse_numstat;
use crate::git::{FileChange, Repository};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// In-memory repository for testing without actual git operations.
///
/// Ranges that were never registered behave like invalid refs.
pub struct MockRepository {
    tags: Vec<(String, Option<DateTime<Utc>>)>,
    commit_counts: HashMap<(String, String), u64>,
    file_changes: HashMap<(String, String), Vec<FileChange>>,
    fail_listing: bool,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        MockRepository {
            tags: Vec::new(),
            commit_counts: HashMap::new(),
            file_changes: HashMap::new(),
            fail_listing: false,
        }
    }

    /// Add a tag whose commit was made at `timestamp`
    pub fn add_tag(&mut self, name: impl Into<String>, timestamp: DateTime<Utc>) {
        self.tags.push((name.into(), Some(timestamp)));
    }

    /// Add a tag that cannot be resolved to a commit
    pub fn add_dangling_tag(&mut self, name: impl Into<String>) {
        self.tags.push((name.into(), None));
    }

    /// Register the commit count for `from..to`
    pub fn set_commit_count(&mut self, from: &str, to: &str, count: u64) {
        self.commit_counts
            .insert((from.to_string(), to.to_string()), count);
    }

    /// Register the changed files for `from..to`
    pub fn set_file_changes(&mut self, from: &str, to: &str, changes: Vec<FileChange>) {
        self.file_changes
            .insert((from.to_string(), to.to_string()), changes);
    }

    /// Register the changed files for `from..to` from `git diff --numstat` text
    pub fn set_numstat(&mut self, from: &str, to: &str, numstat: &str) {
        self.set_file_changes(from, to, parse_numstat(numstat));
    }

    /// Make `list_tags` fail
    pub fn fail_tag_listing(&mut self) {
        self.fail_listing = true;
    }

    fn knows_ref(&self, name: &str) -> bool {
        name == "HEAD" || self.tags.iter().any(|(tag, ts)| tag == name && ts.is_some())
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn list_tags(&self) -> Result<Vec<String>> {
        if self.fail_listing {
            return Err(MetricsError::repository("tag listing failed"));
        }
        Ok(self.tags.iter().map(|(name, _)| name.clone()).collect())
    }

    fn tag_commit_time(&self, tag_name: &str) -> Result<DateTime<Utc>> {
        self.tags
            .iter()
            .find(|(name, _)| name == tag_name)
            .and_then(|(_, ts)| *ts)
            .ok_or_else(|| MetricsError::repository(format!("Cannot resolve tag '{}'", tag_name)))
    }

    fn count_commits(&self, from_ref: &str, to_ref: &str) -> Result<u64> {
        if from_ref == to_ref && self.knows_ref(from_ref) {
            return Ok(0);
        }
        self.commit_counts
            .get(&(from_ref.to_string(), to_ref.to_string()))
            .copied()
            .ok_or_else(|| {
                MetricsError::repository(format!("Unknown range {}..{}", from_ref, to_ref))
            })
    }

    fn file_changes(&self, from_ref: &str, to_ref: &str) -> Result<Vec<FileChange>> {
        if from_ref == to_ref && self.knows_ref(from_ref) {
            return Ok(Vec::new());
        }
        self.file_changes
            .get(&(from_ref.to_string(), to_ref.to_string()))
            .cloned()
            .ok_or_else(|| {
                MetricsError::repository(format!("Unknown range {}..{}", from_ref, to_ref))
            })
    }
}
