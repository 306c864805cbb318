//! Commit counting and line churn between release tags

use crate::domain::{LineDiff, Tag, TagMetrics};
use crate::git::{FileChange, Repository};
use crate::warning::Warning;
use glob::Pattern;

/// File-exclusion rules applied to diff summaries.
///
/// Each pattern is tried against the full path and against the basename, so
/// `package-lock.json` matches at any depth and `node_modules/*` matches
/// everything below that directory. `*` also matches `/`.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    patterns: Vec<Exclusion>,
}

#[derive(Debug, Clone)]
enum Exclusion {
    Glob(Pattern),
    /// Not a valid glob; compared literally
    Literal(String),
}

impl Exclusion {
    fn matches(&self, candidate: &str) -> bool {
        match self {
            Exclusion::Glob(pattern) => pattern.matches(candidate),
            Exclusion::Literal(literal) => literal == candidate,
        }
    }
}

impl ExclusionSet {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Self {
        let patterns = patterns
            .iter()
            .map(|p| {
                let p = p.as_ref();
                match Pattern::new(p) {
                    Ok(pattern) => Exclusion::Glob(pattern),
                    Err(_) => Exclusion::Literal(p.to_string()),
                }
            })
            .collect();
        ExclusionSet { patterns }
    }

    /// Whether a changed path is removed from the metrics
    pub fn is_excluded(&self, path: &str) -> bool {
        let basename = path.rsplit('/').next().unwrap_or(path);
        self.patterns
            .iter()
            .any(|p| p.matches(path) || p.matches(basename))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// One parsed line of a numstat summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumstatLine<'a> {
    /// `None` for binary files
    pub added: Option<u64>,
    pub removed: Option<u64>,
    pub path: &'a str,
}

fn split_field(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    let end = s.find(char::is_whitespace)?;
    Some((&s[..end], s[end..].trim_start()))
}

fn parse_count(field: &str) -> Option<Option<u64>> {
    if field == "-" {
        Some(None)
    } else {
        field.parse::<u64>().ok().map(Some)
    }
}

/// Parse `added<ws>removed<ws>path`, as printed by `git diff --numstat`
/// (tab separated) or by libgit2 (space padded).
///
/// Returns `None` for anything that does not have that shape.
pub fn parse_numstat_line(line: &str) -> Option<NumstatLine<'_>> {
    let (added, rest) = split_field(line)?;
    let (removed, path) = split_field(rest)?;
    let path = path.trim_end();
    if path.is_empty() {
        return None;
    }

    Some(NumstatLine {
        added: parse_count(added)?,
        removed: parse_count(removed)?,
        path,
    })
}

/// Parse a whole numstat listing, skipping blank and malformed lines
pub fn parse_numstat(numstat: &str) -> Vec<FileChange> {
    numstat
        .lines()
        .filter_map(parse_numstat_line)
        .map(|line| FileChange {
            path: line.path.to_string(),
            added: line.added,
            removed: line.removed,
        })
        .collect()
}

/// Fold per-file changes into line metrics, dropping excluded paths.
///
/// Binary files count as changed files but contribute no lines.
pub fn summarize(changes: &[FileChange], exclusions: &ExclusionSet) -> LineDiff {
    let mut diff = LineDiff::default();

    for change in changes.iter().filter(|c| !exclusions.is_excluded(&c.path)) {
        diff.files_changed += 1;
        diff.lines_added += change.added.unwrap_or(0);
        diff.lines_removed += change.removed.unwrap_or(0);
    }

    diff
}

/// Count commits introduced by `to_ref` relative to `from_ref`.
///
/// An invalid range yields `0` and a warning instead of an error.
pub fn commits_between<R: Repository>(
    repo: &R,
    from_ref: &str,
    to_ref: &str,
) -> (u64, Option<Warning>) {
    match repo.count_commits(from_ref, to_ref) {
        Ok(count) => (count, None),
        Err(e) => (
            0,
            Some(Warning::InvalidRange {
                from: from_ref.to_string(),
                to: to_ref.to_string(),
                reason: e.to_string(),
            }),
        ),
    }
}

/// Line churn between two refs after applying exclusions.
///
/// A diff that cannot be produced yields zero metrics and a warning.
pub fn line_diff<R: Repository>(
    repo: &R,
    from_ref: &str,
    to_ref: &str,
    exclusions: &ExclusionSet,
) -> (LineDiff, Option<Warning>) {
    match repo.file_changes(from_ref, to_ref) {
        Ok(changes) => (summarize(&changes, exclusions), None),
        Err(e) => (
            LineDiff::default(),
            Some(Warning::DiffFailed {
                from: from_ref.to_string(),
                to: to_ref.to_string(),
                reason: e.to_string(),
            }),
        ),
    }
}

/// Build one [TagMetrics] per tag from a newest-first tag list.
///
/// Every tag is measured against the next older tag; the oldest tag gets a
/// zero-metric baseline record.
pub fn tag_series<R: Repository>(
    repo: &R,
    tags: &[Tag],
    exclusions: &ExclusionSet,
) -> (Vec<TagMetrics>, Vec<Warning>) {
    let mut series = Vec::with_capacity(tags.len());
    let mut warnings = Vec::new();

    for (i, tag) in tags.iter().enumerate() {
        let Some(previous) = tags.get(i + 1) else {
            series.push(TagMetrics::baseline(tag.clone()));
            continue;
        };

        let (commits, warning) = commits_between(repo, &previous.name, &tag.name);
        warnings.extend(warning);
        let (diff, warning) = line_diff(repo, &previous.name, &tag.name, exclusions);
        warnings.extend(warning);

        tracing::debug!(
            from = %previous.name,
            to = %tag.name,
            commits,
            added = diff.lines_added,
            removed = diff.lines_removed,
            "measured release"
        );

        series.push(TagMetrics::delta(tag.clone(), previous, commits, diff));
    }

    (series, warnings)
}

/// Commits on `HEAD` that are not part of the newest tag yet
pub fn unreleased_commits<R: Repository>(repo: &R, newest: &Tag) -> (u64, Option<Warning>) {
    commits_between(repo, &newest.name, "HEAD")
}
