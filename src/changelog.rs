//! Changelog parsing
//!
//! A line-oriented state machine over "Keep a Changelog" style documents:
//!
//! ```text
//! ## [1.2.3] - 2025-11-15
//! ### Added
//! - ABC-123 Did X
//! ```
//!
//! Each line is first classified into a [Line] and then folded into the
//! open release. Parsing is lenient: bad dates and unknown sections become
//! warnings, and lines that fit no shape are ignored without a warning.

use crate::domain::{
    normalize_version, ChangeType, ChangelogEntry, ChangelogRelease, ProjectChangelog,
};
use crate::error::{MetricsError, Result};
use crate::warning::Warning;
use chrono::NaiveDate;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

fn release_header_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^##\s+(?:\[(?P<bracketed>v?\d+\.\d+\.\d+(?:-[A-Za-z0-9.]+)?|(?i:unreleased))\]|(?P<bare>v?\d+\.\d+\.\d+(?:-[A-Za-z0-9.]+)?))(?P<rest>.*)$",
        )
        .expect("release header pattern is valid")
    })
}

fn section_header_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^###\s+(.+?)\s*$").expect("section header pattern is valid")
    })
}

fn entry_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\s*[-*+]\s+(.+?)\s*$").expect("entry pattern is valid"))
}

/// Classification of a single changelog line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    /// `## [version] - date`; `date` holds whatever followed the version
    ReleaseHeader {
        version: &'a str,
        date: Option<&'a str>,
    },
    /// `### Heading`
    SectionHeader(&'a str),
    /// Bulleted entry text without the bullet
    Entry(&'a str),
    Unrecognized,
}

impl<'a> Line<'a> {
    pub fn classify(line: &'a str) -> Self {
        let trimmed = line.trim();

        if let Some(caps) = release_header_pattern().captures(trimmed) {
            let version = caps
                .name("bracketed")
                .or_else(|| caps.name("bare"))
                .map(|m| m.as_str().trim())
                .unwrap_or_default();
            let date = caps
                .name("rest")
                .map(|m| {
                    m.as_str()
                        .trim()
                        .trim_start_matches(['-', '–', '—'])
                        .trim()
                        .trim_start_matches('(')
                        .trim_end_matches(')')
                        .trim()
                })
                .filter(|d| !d.is_empty());
            return Line::ReleaseHeader { version, date };
        }

        if let Some(caps) = section_header_pattern().captures(trimmed) {
            if let Some(heading) = caps.get(1) {
                return Line::SectionHeader(heading.as_str());
            }
        }

        if let Some(caps) = entry_pattern().captures(line) {
            if let Some(text) = caps.get(1) {
                return Line::Entry(text.as_str());
            }
        }

        Line::Unrecognized
    }
}

/// Parser configured with the ticket prefixes to look for in entries
#[derive(Debug, Clone)]
pub struct ChangelogParser {
    tickets: Regex,
}

impl ChangelogParser {
    /// Build a parser that extracts `PREFIX-123` references.
    ///
    /// With no prefixes configured any upper-case alphabetic prefix is
    /// accepted.
    pub fn new<S: AsRef<str>>(ticket_prefixes: &[S]) -> Result<Self> {
        let pattern = if ticket_prefixes.is_empty() {
            r"\b[A-Z]+-\d+\b".to_string()
        } else {
            let alternatives: Vec<String> = ticket_prefixes
                .iter()
                .map(|p| regex::escape(p.as_ref().trim()))
                .collect();
            format!(r"\b(?:{})-\d+\b", alternatives.join("|"))
        };

        let tickets = Regex::new(&pattern)
            .map_err(|e| MetricsError::config(format!("Invalid ticket prefixes: {}", e)))?;
        Ok(ChangelogParser { tickets })
    }

    /// Distinct ticket references in an entry
    pub fn extract_tickets(&self, text: &str) -> BTreeSet<String> {
        self.tickets
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Parse a changelog document for one project
    pub fn parse(&self, project_name: &str, text: &str) -> ProjectChangelog {
        let mut state = ParseState::default();

        for line in text.lines() {
            match Line::classify(line) {
                Line::ReleaseHeader { version, date } => state.open_release(version, date),
                Line::SectionHeader(heading) => state.enter_section(heading),
                Line::Entry(description) => {
                    let tickets = self.extract_tickets(description);
                    state.push_entry(description, tickets);
                }
                Line::Unrecognized => {}
            }
        }

        let (releases, parse_warnings) = state.finish();
        tracing::debug!(
            project = project_name,
            releases = releases.len(),
            warnings = parse_warnings.len(),
            "parsed changelog"
        );

        ProjectChangelog {
            project_name: project_name.to_string(),
            releases,
            parse_warnings,
        }
    }
}

#[derive(Default)]
struct ParseState {
    releases: Vec<ChangelogRelease>,
    current: Option<ChangelogRelease>,
    section: Option<ChangeType>,
    warnings: Vec<Warning>,
}

impl ParseState {
    fn open_release(&mut self, version: &str, date: Option<&str>) {
        self.close_release();

        let version = normalize_version(version).to_string();
        let mut release = ChangelogRelease::new(version, None);

        if release.is_unreleased() {
            release.date = date.and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());
        } else {
            match date {
                None => self.warnings.push(Warning::MissingReleaseDate {
                    version: release.version.clone(),
                }),
                Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                    Ok(parsed) => release.date = Some(parsed),
                    Err(_) => self.warnings.push(Warning::MalformedReleaseDate {
                        version: release.version.clone(),
                        value: raw.to_string(),
                    }),
                },
            }
        }

        self.current = Some(release);
    }

    fn enter_section(&mut self, heading: &str) {
        if self.current.is_none() {
            return;
        }

        self.section = Some(ChangeType::from_heading(heading).unwrap_or_else(|| {
            self.warnings.push(Warning::UnknownSection {
                heading: heading.to_string(),
            });
            ChangeType::Other
        }));
    }

    fn push_entry(&mut self, description: &str, tickets: BTreeSet<String>) {
        let change_type = self.section.unwrap_or(ChangeType::Other);
        if let Some(release) = self.current.as_mut() {
            release.entries.push(ChangelogEntry {
                description: description.to_string(),
                change_type,
                tickets,
            });
        }
    }

    fn close_release(&mut self) {
        if let Some(release) = self.current.take() {
            self.releases.push(release);
        }
        self.section = None;
    }

    fn finish(mut self) -> (Vec<ChangelogRelease>, Vec<Warning>) {
        self.close_release();
        (self.releases, self.warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> ChangelogParser {
        ChangelogParser::new::<&str>(&[]).unwrap()
    }

    #[test]
    fn test_classify_lines() {
        assert_eq!(
            Line::classify("## [1.2.3] - 2025-11-15"),
            Line::ReleaseHeader {
                version: "1.2.3",
                date: Some("2025-11-15")
            }
        );
        assert_eq!(
            Line::classify("## [1.2.1]"),
            Line::ReleaseHeader {
                version: "1.2.1",
                date: None
            }
        );
        assert_eq!(
            Line::classify("## v2.0.0 (2024-01-02)"),
            Line::ReleaseHeader {
                version: "v2.0.0",
                date: Some("2024-01-02")
            }
        );
        assert_eq!(Line::classify("### Added"), Line::SectionHeader("Added"));
        assert_eq!(Line::classify("- did a thing"), Line::Entry("did a thing"));
        assert_eq!(Line::classify("  * nested thing"), Line::Entry("nested thing"));
        assert_eq!(Line::classify("# Changelog"), Line::Unrecognized);
        assert_eq!(Line::classify("## Notes"), Line::Unrecognized);
        assert_eq!(Line::classify("## [Docs]"), Line::Unrecognized);
        assert_eq!(Line::classify("free-form text"), Line::Unrecognized);
    }

    #[test]
    fn test_parse_single_release() {
        let changelog = parser().parse("svc", "## [1.2.3] - 2025-11-15\n### Added\n- ABC-123 Did X");

        assert_eq!(changelog.project_name, "svc");
        assert!(changelog.parse_warnings.is_empty());
        assert_eq!(changelog.releases.len(), 1);

        let release = &changelog.releases[0];
        assert_eq!(release.version, "1.2.3");
        assert_eq!(release.date, NaiveDate::from_ymd_opt(2025, 11, 15));
        assert_eq!(release.entries.len(), 1);
        assert_eq!(release.entries[0].change_type, ChangeType::Added);
        assert_eq!(
            release.entries[0].tickets,
            BTreeSet::from(["ABC-123".to_string()])
        );
    }

    #[test]
    fn test_missing_date_adds_one_warning() {
        let changelog = parser().parse("svc", "## [1.2.1]\n### Fixed\n- patch");

        assert_eq!(changelog.releases.len(), 1);
        assert_eq!(changelog.releases[0].date, None);
        assert_eq!(
            changelog.parse_warnings,
            vec![Warning::MissingReleaseDate {
                version: "1.2.1".to_string()
            }]
        );
    }

    #[test]
    fn test_malformed_date_keeps_release() {
        let changelog = parser().parse("svc", "## [1.0.0] - someday\n- thing");

        assert_eq!(changelog.releases.len(), 1);
        assert_eq!(changelog.releases[0].date, None);
        assert_eq!(changelog.releases[0].entries.len(), 1);
        assert!(matches!(
            &changelog.parse_warnings[..],
            [Warning::MalformedReleaseDate { value, .. }] if value == "someday"
        ));
    }

    #[test]
    fn test_unreleased_is_not_warned() {
        let text = "## [Unreleased]\n### Changed\n- wip\n## [1.0.0] - 2025-01-01\n### Removed\n- old";
        let changelog = parser().parse("svc", text);

        assert!(changelog.parse_warnings.is_empty());
        assert_eq!(changelog.releases.len(), 2);
        assert!(changelog.releases[0].is_unreleased());
        assert_eq!(changelog.releases[0].entries[0].change_type, ChangeType::Changed);
        assert_eq!(changelog.releases[1].entries[0].change_type, ChangeType::Removed);
    }

    #[test]
    fn test_bracketed_non_version_heading_is_not_a_release() {
        let text = "## [unreleased]\n## [1.0.0] - 2025-01-01\n### Added\n- thing\n## [Docs]\n";
        let changelog = parser().parse("svc", text);

        assert!(changelog.parse_warnings.is_empty(), "{:?}", changelog.parse_warnings);
        assert_eq!(changelog.releases.len(), 2);
        assert!(changelog.releases[0].is_unreleased());
        assert_eq!(changelog.releases[1].version, "1.0.0");
    }

    #[test]
    fn test_unknown_section_maps_to_other() {
        let changelog = parser().parse("svc", "## [1.0.0] - 2025-01-01\n### Security\n- patched");

        assert_eq!(changelog.releases[0].entries[0].change_type, ChangeType::Other);
        assert_eq!(
            changelog.parse_warnings,
            vec![Warning::UnknownSection {
                heading: "Security".to_string()
            }]
        );
    }

    #[test]
    fn test_free_text_and_preamble_are_ignored() {
        let text = "# Changelog\nAll notable changes.\n- stray bullet\n\n## [1.0.0] - 2025-01-01\nSome prose.\n### Fixed\n- real entry\n";
        let changelog = parser().parse("svc", text);

        assert!(changelog.parse_warnings.is_empty());
        assert_eq!(changelog.releases.len(), 1);
        assert_eq!(changelog.releases[0].entries.len(), 1);
        assert_eq!(changelog.releases[0].entries[0].description, "real entry");
    }

    #[test]
    fn test_section_resets_between_releases() {
        let text = "## [2.0.0] - 2025-02-01\n### Fixed\n- a\n## [1.0.0] - 2025-01-01\n- b\n";
        let changelog = parser().parse("svc", text);

        assert_eq!(changelog.releases[1].entries[0].change_type, ChangeType::Other);
    }

    #[test]
    fn test_version_prefix_is_stripped() {
        let changelog = parser().parse("svc", "## [v3.1.0] - 2025-03-01\n");
        assert_eq!(changelog.releases[0].version, "3.1.0");
    }

    #[test]
    fn test_multiple_configured_tickets() {
        let parser = ChangelogParser::new(&["ABC", "OPS"]).unwrap();
        let tickets = parser.extract_tickets("ABC-1 and OPS-22, again ABC-1, not XYZ-3 or abc-4");

        assert_eq!(
            tickets,
            BTreeSet::from(["ABC-1".to_string(), "OPS-22".to_string()])
        );
    }

    #[test]
    fn test_parse_is_idempotent() {
        let text = "## [1.1.0] - 2025-06-01\n### Added\n- X-1 one\n### Weird\n- two\n## [1.0.0]\n";
        let p = parser();
        assert_eq!(p.parse("svc", text), p.parse("svc", text));
    }
}
