//! Release tag discovery and ordering

use crate::domain::{is_semantic_version, Tag};
use crate::error::Result;
use crate::git::Repository;
use crate::warning::Warning;
use std::collections::HashSet;

/// Resolved tags for one repository, newest first, plus anything skipped
#[derive(Debug, Clone, Default)]
pub struct TagResolution {
    pub tags: Vec<Tag>,
    pub warnings: Vec<Warning>,
}

/// Enumerate semantic-version tags and order them by commit time.
///
/// Non-version tags and tags that cannot be peeled to a commit are skipped
/// with a warning. When two refs normalize to the same version (`v1.2.3`
/// and `1.2.3`) only the first in sorted order is kept.
///
/// # Returns
/// * `Ok(TagResolution)` - Tags sorted newest first
/// * `Err` - Only when the tag list itself cannot be read
pub fn resolve<R: Repository>(repo: &R) -> Result<TagResolution> {
    let mut warnings = Vec::new();
    let mut tags = Vec::new();

    for name in repo.list_tags()? {
        if !is_semantic_version(&name) {
            warnings.push(Warning::UnparsableTag { tag: name });
            continue;
        }

        match repo.tag_commit_time(&name) {
            Ok(timestamp) => {
                if let Some(tag) = Tag::new(name, timestamp) {
                    tags.push(tag);
                }
            }
            Err(e) => warnings.push(Warning::UnresolvedTag {
                tag: name,
                reason: e.to_string(),
            }),
        }
    }

    tags.sort_by(Tag::newest_first);

    let mut seen: HashSet<String> = HashSet::new();
    let mut kept: Vec<Tag> = Vec::with_capacity(tags.len());
    for tag in tags {
        if seen.insert(tag.version.clone()) {
            kept.push(tag);
        } else if let Some(first) = kept.iter().find(|t| t.version == tag.version) {
            warnings.push(Warning::DuplicateVersion {
                tag: tag.name.clone(),
                kept: first.name.clone(),
            });
        }
    }

    tracing::debug!(
        tags = kept.len(),
        skipped = warnings.len(),
        "resolved release tags"
    );

    Ok(TagResolution {
        tags: kept,
        warnings,
    })
}
