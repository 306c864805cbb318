use crate::error::{MetricsError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name searched for in the working directory and the user config dir
pub const CONFIG_FILE_NAME: &str = "release-metrics.toml";

/// Complete configuration for release-metrics.
///
/// Every section is optional; an empty file yields the defaults.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// Directory that `included_projects` are resolved against
    #[serde(default = "default_projects_directory")]
    pub projects_directory: PathBuf,

    #[serde(default)]
    pub included_projects: Vec<String>,

    /// Projects living outside `projects_directory`
    #[serde(default)]
    pub projects: Vec<ProjectEntry>,

    #[serde(default = "default_file_exclusions")]
    pub file_exclusions: Vec<String>,

    #[serde(default)]
    pub changelog: ChangelogConfig,

    #[serde(default)]
    pub run: RunConfig,
}

/// An explicitly named repository
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ProjectEntry {
    pub name: String,
    pub path: PathBuf,
}

fn default_projects_directory() -> PathBuf {
    PathBuf::from(".")
}

/// Lock files, vendored dependencies and build output.
fn default_file_exclusions() -> Vec<String> {
    vec![
        "*.lock".to_string(),
        "package-lock.json".to_string(),
        "*.min.js".to_string(),
        "node_modules/*".to_string(),
        "dist/*".to_string(),
    ]
}

fn default_changelog_file() -> String {
    "CHANGELOG.md".to_string()
}

/// Where changelogs live inside each repository and how tickets look
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ChangelogConfig {
    #[serde(default = "default_changelog_file")]
    pub file: String,

    /// Ticket prefixes such as `ABC` for `ABC-123`; empty accepts any
    /// upper-case prefix
    #[serde(default)]
    pub ticket_prefixes: Vec<String>,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        ChangelogConfig {
            file: default_changelog_file(),
            ticket_prefixes: Vec::new(),
        }
    }
}

fn default_jobs() -> usize {
    1
}

fn default_timeout_secs() -> u64 {
    300
}

/// Execution limits for the collection run
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    #[serde(default = "default_jobs")]
    pub jobs: usize,

    /// Per-project wall-clock limit
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            jobs: default_jobs(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            projects_directory: default_projects_directory(),
            included_projects: Vec::new(),
            projects: Vec::new(),
            file_exclusions: default_file_exclusions(),
            changelog: ChangelogConfig::default(),
            run: RunConfig::default(),
        }
    }
}

impl Config {
    /// Parse a TOML document
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| MetricsError::config(e.to_string()))
    }

    /// Resolve the configured projects to `(name, path)` pairs.
    ///
    /// Included names come first, joined onto `projects_directory`, followed
    /// by explicit `[[projects]]` entries in file order.
    pub fn project_list(&self) -> Vec<ProjectEntry> {
        self.included_projects
            .iter()
            .map(|name| ProjectEntry {
                name: name.clone(),
                path: self.projects_directory.join(name),
            })
            .chain(self.projects.iter().cloned())
            .collect()
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `release-metrics.toml` in current directory
/// 3. `release-metrics.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read or parsed, or an explicit
///   path does not exist
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let path = match config_path {
        Some(path) => Some(PathBuf::from(path)),
        None => find_config_file(),
    };

    let Some(path) = path else {
        tracing::debug!("no configuration file found, using defaults");
        return Ok(Config::default());
    };

    tracing::debug!(path = %path.display(), "loading configuration");
    let text = fs::read_to_string(&path)
        .map_err(|e| MetricsError::config(format!("{}: {}", path.display(), e)))?;
    toml::from_str(&text).map_err(|e| MetricsError::config(format!("{}: {}", path.display(), e)))
}

fn find_config_file() -> Option<PathBuf> {
    let local = Path::new(".").join(CONFIG_FILE_NAME);
    if local.exists() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .filter(|path| path.exists())
}
