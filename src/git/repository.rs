use crate::error::{MetricsError, Result};
use chrono::{DateTime, Utc};
use super::FileChange;
use git2::{Commit, Patch, Repository as Git2Repo};
use std::path::Path;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open the repository at exactly `path` (no parent discovery, so a
    /// plain directory inside another checkout is reported as invalid)
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::open(path)?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    /// Resolve a ref to a commit, preferring `refs/tags/<name>` so a branch
    /// with the same name as a tag never shadows it.
    fn resolve_commit(&self, refname: &str) -> Result<Commit<'_>> {
        if let Ok(reference) = self.repo.find_reference(&format!("refs/tags/{}", refname)) {
            return reference.peel_to_commit().map_err(|e| {
                MetricsError::repository(format!(
                    "Cannot peel tag '{}' to a commit: {}",
                    refname, e
                ))
            });
        }

        let object = self
            .repo
            .revparse_single(refname)
            .map_err(|e| MetricsError::repository(format!("Cannot resolve '{}': {}", refname, e)))?;
        object.peel_to_commit().map_err(|e| {
            MetricsError::repository(format!("'{}' does not point to a commit: {}", refname, e))
        })
    }
}

impl super::Repository for Git2Repository {
    fn list_tags(&self) -> Result<Vec<String>> {
        let tags = self.repo.tag_names(None)?;

        Ok(tags.iter().flatten().map(|s| s.to_string()).collect())
    }

    fn tag_commit_time(&self, tag_name: &str) -> Result<DateTime<Utc>> {
        let reference = self
            .repo
            .find_reference(&format!("refs/tags/{}", tag_name))
            .map_err(|e| MetricsError::repository(format!("Cannot find tag '{}': {}", tag_name, e)))?;

        let commit = reference.peel_to_commit().map_err(|e| {
            MetricsError::repository(format!("Cannot peel tag '{}' to a commit: {}", tag_name, e))
        })?;

        DateTime::from_timestamp(commit.time().seconds(), 0).ok_or_else(|| {
            MetricsError::repository(format!("Tag '{}' has an invalid commit time", tag_name))
        })
    }

    fn count_commits(&self, from_ref: &str, to_ref: &str) -> Result<u64> {
        let from = self.resolve_commit(from_ref)?;
        let to = self.resolve_commit(to_ref)?;

        let mut revwalk = self.repo.revwalk()?;
        revwalk.push(to.id())?;
        revwalk.hide(from.id())?;

        let mut count = 0;
        for oid in revwalk {
            oid?;
            count += 1;
        }
        Ok(count)
    }

    fn file_changes(&self, from_ref: &str, to_ref: &str) -> Result<Vec<FileChange>> {
        let from_tree = self.resolve_commit(from_ref)?.tree()?;
        let to_tree = self.resolve_commit(to_ref)?.tree()?;

        let diff = self
            .repo
            .diff_tree_to_tree(Some(&from_tree), Some(&to_tree), None)?;

        let mut changes = Vec::with_capacity(diff.deltas().len());
        for (index, delta) in diff.deltas().enumerate() {
            // Deleted files only carry the old path
            let path = delta
                .new_file()
                .path()
                .or_else(|| delta.old_file().path())
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default();

            // libgit2 yields no patch for binary content
            let change = match Patch::from_diff(&diff, index)? {
                Some(patch) if !patch.delta().flags().is_binary() => {
                    let (_, added, removed) = patch.line_stats()?;
                    FileChange::text(path, added as u64, removed as u64)
                }
                _ => FileChange::binary(path),
            };
            changes.push(change);
        }

        Ok(changes)
    }
}
