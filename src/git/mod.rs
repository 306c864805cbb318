//! Git access abstraction layer
//!
//! The metrics engine only needs four read-only queries from a repository.
//! They are expressed by the [Repository] trait so the tag resolver and the
//! diff calculator can be exercised against an in-memory fake as well as a
//! real repository.
//!
//! - [repository::Git2Repository]: real implementation using the `git2` crate
//! - [mock::MockRepository]: in-memory implementation for tests
//!
//! ```rust
//! # use release_metrics::git::Repository;
//! # fn example<R: Repository>(repo: &R) -> release_metrics::Result<()> {
//! for name in repo.list_tags()? {
//!     let when = repo.tag_commit_time(&name)?;
//!     println!("{} -> {}", name, when);
//! }
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::error::Result;
use chrono::{DateTime, Utc};

/// Read-only git queries used by the metrics engine.
///
/// Refs are passed as strings: tag names, `HEAD`, or anything else the
/// implementation can resolve to a commit. Implementations map underlying
/// failures to [crate::error::MetricsError]; callers decide whether a
/// failure is fatal or becomes a warning.
pub trait Repository {
    /// Names of all tags in the repository, in no particular order
    fn list_tags(&self) -> Result<Vec<String>>;

    /// Commit time of the commit a tag points to.
    ///
    /// Annotated tags are peeled to their target commit, so this is never
    /// the tag object's creation time.
    fn tag_commit_time(&self, tag_name: &str) -> Result<DateTime<Utc>>;

    /// Number of commits reachable from `to_ref` but not from `from_ref`
    fn count_commits(&self, from_ref: &str, to_ref: &str) -> Result<u64>;

    /// One row per file changed between two refs
    fn file_changes(&self, from_ref: &str, to_ref: &str) -> Result<Vec<FileChange>>;
}

/// Line counts for a single changed file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: String,
    /// `None` for binary files
    pub added: Option<u64>,
    pub removed: Option<u64>,
}

impl FileChange {
    pub fn text(path: impl Into<String>, added: u64, removed: u64) -> Self {
        FileChange {
            path: path.into(),
            added: Some(added),
            removed: Some(removed),
        }
    }

    pub fn binary(path: impl Into<String>) -> Self {
        FileChange {
            path: path.into(),
            added: None,
            removed: None,
        }
    }
}
