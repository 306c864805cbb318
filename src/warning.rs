use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Non-fatal anomalies found while collecting metrics.
///
/// Every component returns these as values next to its result; nothing is
/// written to a shared log. The pipeline prefixes each one with the project
/// name when it flattens them into the final warning list.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// Tag name is not a semantic version after stripping a leading `v`
    UnparsableTag { tag: String },
    /// Tag points at something that cannot be peeled to a commit
    UnresolvedTag { tag: String, reason: String },
    /// Two refs normalize to the same version; only the first is kept
    DuplicateVersion { tag: String, kept: String },
    /// Commit range could not be walked
    InvalidRange {
        from: String,
        to: String,
        reason: String,
    },
    /// Numstat summary between two refs could not be produced
    DiffFailed {
        from: String,
        to: String,
        reason: String,
    },
    MissingRepository { path: PathBuf },
    NotARepository { path: PathBuf, reason: String },
    TagListingFailed { reason: String },
    /// Repository has no semantic-version tags left after filtering
    NoTags,
    MissingChangelog { path: PathBuf },
    UnreadableChangelog { path: PathBuf, reason: String },
    MissingReleaseDate { version: String },
    MalformedReleaseDate { version: String, value: String },
    UnknownSection { heading: String },
    Timeout { limit: Duration },
    WorkerFailed { reason: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnparsableTag { tag } => {
                write!(f, "Skipping tag '{}': not a semantic version", tag)
            }
            Warning::UnresolvedTag { tag, reason } => {
                write!(f, "Skipping tag '{}': cannot resolve commit ({})", tag, reason)
            }
            Warning::DuplicateVersion { tag, kept } => write!(
                f,
                "Skipping tag '{}': same version as tag '{}'",
                tag, kept
            ),
            Warning::InvalidRange { from, to, reason } => write!(
                f,
                "Could not count commits {}..{}: {}",
                from, to, reason
            ),
            Warning::DiffFailed { from, to, reason } => write!(
                f,
                "Could not calculate line changes {}..{}: {}",
                from, to, reason
            ),
            Warning::MissingRepository { path } => {
                write!(f, "Repository path does not exist: {}", path.display())
            }
            Warning::NotARepository { path, reason } => write!(
                f,
                "Not a git repository: {} ({})",
                path.display(),
                reason
            ),
            Warning::TagListingFailed { reason } => write!(f, "Could not list tags: {}", reason),
            Warning::NoTags => write!(f, "No semantic version tags found"),
            Warning::MissingChangelog { path } => {
                write!(f, "No changelog found at {}", path.display())
            }
            Warning::UnreadableChangelog { path, reason } => write!(
                f,
                "Could not read changelog {}: {}",
                path.display(),
                reason
            ),
            Warning::MissingReleaseDate { version } => {
                write!(f, "Changelog release '{}' has no date", version)
            }
            Warning::MalformedReleaseDate { version, value } => write!(
                f,
                "Changelog release '{}' has an unparsable date '{}'",
                version, value
            ),
            Warning::UnknownSection { heading } => write!(
                f,
                "Unrecognized changelog section '{}', counted as Other",
                heading
            ),
            Warning::Timeout { limit } => write!(f, "Processing timed out after {:?}", limit),
            Warning::WorkerFailed { reason } => write!(f, "Processing failed: {}", reason),
        }
    }
}
