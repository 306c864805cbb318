use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use std::cmp::Ordering;
use std::sync::OnceLock;

fn semver_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\d+\.\d+\.\d+(-[A-Za-z0-9]+)?$").expect("semantic version pattern is valid")
    })
}

/// Strip a single leading `v` from a tag or changelog version
/// (e.g., "v1.2.3" -> "1.2.3", "vv1.2.3" -> "v1.2.3")
pub fn normalize_version(name: &str) -> &str {
    name.strip_prefix('v').unwrap_or(name)
}

/// Check whether a tag name is a `MAJOR.MINOR.PATCH[-suffix]` version once
/// an optional leading `v` is removed.
pub fn is_semantic_version(name: &str) -> bool {
    semver_pattern().is_match(normalize_version(name))
}

/// A release tag resolved to the commit it points at
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    /// Ref name as it appears in the repository (used for git lookups)
    pub name: String,
    /// Normalized version (ref name without the leading `v`)
    pub version: String,
    /// Commit time of the tagged commit
    pub timestamp: DateTime<Utc>,
}

impl Tag {
    /// Build a tag from a ref name, returning `None` when the name is not a
    /// semantic version.
    pub fn new(name: impl Into<String>, timestamp: DateTime<Utc>) -> Option<Self> {
        let name = name.into();
        if !is_semantic_version(&name) {
            return None;
        }
        let version = normalize_version(&name).to_string();
        Some(Tag {
            name,
            version,
            timestamp,
        })
    }

    /// Newest-first ordering: timestamp descending, then version precedence
    /// descending, then ref name descending.
    ///
    /// Precedence comes before the name, so tags on the same commit sort as
    /// releases rather than as strings: `10.0.0` precedes `9.0.0` and `1.0.0`
    /// precedes `1.0.0-rc1`, where a plain name comparison gives the reverse.
    pub fn newest_first(a: &Tag, b: &Tag) -> Ordering {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| compare_versions(&b.version, &a.version))
            .then_with(|| b.name.cmp(&a.name))
    }
}

fn compare_versions(a: &str, b: &str) -> Ordering {
    match (semver::Version::parse(a), semver::Version::parse(b)) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_valid_semantic_versions() {
        assert!(is_semantic_version("1.2.3"));
        assert!(is_semantic_version("9.2.6"));
        assert!(is_semantic_version("10.15.20"));
        assert!(is_semantic_version("0.0.1"));
        assert!(is_semantic_version("1.2.3-rc1"));
        assert!(is_semantic_version("1.0.0-RC2"));
    }

    #[test]
    fn test_prefix_invariance() {
        for name in ["1.2.3", "1.2.3-beta", "1.2", "release-1.2.3", "abc"] {
            assert_eq!(
                is_semantic_version(&format!("v{}", name)),
                is_semantic_version(name),
                "prefix changed result for {}",
                name
            );
        }
    }

    #[test]
    fn test_invalid_semantic_versions() {
        assert!(!is_semantic_version("1.2"));
        assert!(!is_semantic_version("release-1.2.3"));
        assert!(!is_semantic_version("1.2.3.4"));
        assert!(!is_semantic_version("1.2.3-rc.1"));
        assert!(!is_semantic_version("V1.2.3"));
        assert!(!is_semantic_version(""));
    }

    #[test]
    fn test_tag_new_normalizes() {
        let tag = Tag::new("v1.2.3", at(0)).unwrap();
        assert_eq!(tag.name, "v1.2.3");
        assert_eq!(tag.version, "1.2.3");
        assert!(Tag::new("production", at(0)).is_none());
    }

    #[test]
    fn test_newest_first_orders_by_time_then_version() {
        let mut tags = vec![
            Tag::new("1.0.0", at(100)).unwrap(),
            Tag::new("9.0.0", at(200)).unwrap(),
            Tag::new("10.0.0", at(200)).unwrap(),
        ];
        tags.sort_by(Tag::newest_first);
        let names: Vec<_> = tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["10.0.0", "9.0.0", "1.0.0"]);
    }

    #[test]
    fn test_newest_first_prefers_release_over_prerelease() {
        let mut tags = vec![
            Tag::new("1.0.0-rc1", at(100)).unwrap(),
            Tag::new("9.0.0", at(100)).unwrap(),
            Tag::new("1.0.0", at(100)).unwrap(),
            Tag::new("10.0.0", at(100)).unwrap(),
        ];
        tags.sort_by(Tag::newest_first);
        let names: Vec<_> = tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["10.0.0", "9.0.0", "1.0.0", "1.0.0-rc1"]);
    }
}
