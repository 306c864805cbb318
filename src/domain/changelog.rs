use crate::warning::Warning;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Category of a changelog entry, taken from its `### <Section>` heading
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ChangeType {
    Added,
    Fixed,
    Changed,
    Removed,
    Other,
}

impl ChangeType {
    /// Map a section heading to a change type (case-insensitive).
    ///
    /// Returns `None` for headings outside the known vocabulary so the
    /// caller can decide how to report them.
    pub fn from_heading(heading: &str) -> Option<Self> {
        match heading.trim().to_ascii_lowercase().as_str() {
            "added" => Some(ChangeType::Added),
            "fixed" => Some(ChangeType::Fixed),
            "changed" => Some(ChangeType::Changed),
            "removed" => Some(ChangeType::Removed),
            _ => None,
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChangeType::Added => "Added",
            ChangeType::Fixed => "Fixed",
            ChangeType::Changed => "Changed",
            ChangeType::Removed => "Removed",
            ChangeType::Other => "Other",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangelogEntry {
    pub description: String,
    pub change_type: ChangeType,
    pub tickets: BTreeSet<String>,
}

/// One `## [version]` block of a changelog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangelogRelease {
    /// Version without a leading `v`, or the `Unreleased` placeholder
    pub version: String,
    pub date: Option<NaiveDate>,
    pub entries: Vec<ChangelogEntry>,
}

impl ChangelogRelease {
    pub fn new(version: impl Into<String>, date: Option<NaiveDate>) -> Self {
        ChangelogRelease {
            version: version.into(),
            date,
            entries: Vec::new(),
        }
    }

    pub fn is_unreleased(&self) -> bool {
        self.version.eq_ignore_ascii_case("unreleased")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectChangelog {
    pub project_name: String,
    pub releases: Vec<ChangelogRelease>,
    pub parse_warnings: Vec<Warning>,
}
