//! Per-project collection and the batch driver
//!
//! Each project is scanned on its own worker thread and owns all of its
//! data, so a broken repository or a stuck diff only costs that project.
//! Results are merged back in input order, which keeps the warning list
//! deterministic whatever the scheduling was.

use crate::aggregate::aggregate;
use crate::changelog::ChangelogParser;
use crate::config::{Config, ProjectEntry};
use crate::diff::{self, ExclusionSet};
use crate::domain::{AggregatedMetrics, Period, ProjectChangelog, TagMetrics};
use crate::error::{MetricsError, Result};
use crate::git::{Git2Repository, Repository};
use crate::tags;
use crate::warning::Warning;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

/// Settings shared by every project scan
#[derive(Debug, Clone)]
pub struct CollectOptions {
    pub exclusions: ExclusionSet,
    pub parser: ChangelogParser,
    /// Changelog location relative to the repository root
    pub changelog_file: String,
    /// Number of projects scanned concurrently
    pub jobs: usize,
    pub timeout: Duration,
}

impl CollectOptions {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(CollectOptions {
            exclusions: ExclusionSet::new(&config.file_exclusions),
            parser: ChangelogParser::new(&config.changelog.ticket_prefixes)?,
            changelog_file: config.changelog.file.clone(),
            jobs: config.run.jobs.max(1),
            timeout: Duration::from_secs(config.run.timeout_secs),
        })
    }
}

/// Raw per-project data behind the aggregate
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectScan {
    pub name: String,
    pub path: PathBuf,
    /// Newest first; the last record is the baseline
    pub tag_metrics: Vec<TagMetrics>,
    /// Commits on `HEAD` after the newest tag
    pub unreleased_commits: u64,
    #[serde(skip)]
    pub warnings: Vec<Warning>,
}

impl ProjectScan {
    fn empty(project: &ProjectEntry) -> Self {
        ProjectScan {
            name: project.name.clone(),
            path: project.path.clone(),
            ..Default::default()
        }
    }

    fn failed(project: &ProjectEntry, warning: Warning) -> Self {
        ProjectScan {
            warnings: vec![warning],
            ..Self::empty(project)
        }
    }
}

/// Everything collected for one project
#[derive(Debug, Clone)]
pub struct ProjectOutcome {
    pub scan: ProjectScan,
    pub changelog: Option<ProjectChangelog>,
}

/// Final result of a collection run
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub metrics: AggregatedMetrics,
    pub projects: Vec<ProjectScan>,
    /// `"<project>: <warning>"`, in project input order
    pub warnings: Vec<String>,
}

/// Resolve tags, measure every release and count unreleased commits.
///
/// Never fails: a repository whose tags cannot be listed, or that has no
/// version tags, yields an empty series plus a warning.
pub fn scan_repository<R: Repository>(
    repo: &R,
    exclusions: &ExclusionSet,
) -> (Vec<TagMetrics>, u64, Vec<Warning>) {
    let resolution = match tags::resolve(repo) {
        Ok(resolution) => resolution,
        Err(e) => {
            return (
                Vec::new(),
                0,
                vec![Warning::TagListingFailed {
                    reason: e.to_string(),
                }],
            )
        }
    };

    let mut warnings = resolution.warnings;
    let Some(newest) = resolution.tags.first() else {
        warnings.push(Warning::NoTags);
        return (Vec::new(), 0, warnings);
    };

    let (unreleased, warning) = diff::unreleased_commits(repo, newest);
    warnings.extend(warning);

    let (series, series_warnings) = diff::tag_series(repo, &resolution.tags, exclusions);
    warnings.extend(series_warnings);

    (series, unreleased, warnings)
}

/// Read and parse `<repo>/<changelog_file>`.
///
/// A missing file is reported as a warning; the project still counts.
pub fn read_changelog(
    project_name: &str,
    repo_path: &Path,
    changelog_file: &str,
    parser: &ChangelogParser,
) -> std::result::Result<ProjectChangelog, Warning> {
    let path = repo_path.join(changelog_file);
    match fs::read_to_string(&path) {
        Ok(text) => Ok(parser.parse(project_name, &text)),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(Warning::MissingChangelog { path }),
        Err(e) => Err(Warning::UnreadableChangelog {
            path,
            reason: e.to_string(),
        }),
    }
}

/// Collect tag metrics and the changelog of a single project
pub fn collect_project(project: &ProjectEntry, options: &CollectOptions) -> ProjectOutcome {
    tracing::info!(project = %project.name, path = %project.path.display(), "scanning project");

    if !project.path.exists() {
        return ProjectOutcome {
            scan: ProjectScan::failed(
                project,
                Warning::MissingRepository {
                    path: project.path.clone(),
                },
            ),
            changelog: None,
        };
    }

    let repo = match Git2Repository::open(&project.path) {
        Ok(repo) => repo,
        Err(e) => {
            return ProjectOutcome {
                scan: ProjectScan::failed(
                    project,
                    Warning::NotARepository {
                        path: project.path.clone(),
                        reason: e.to_string(),
                    },
                ),
                changelog: None,
            }
        }
    };

    let (tag_metrics, unreleased_commits, mut warnings) =
        scan_repository(&repo, &options.exclusions);

    let changelog = match read_changelog(
        &project.name,
        &project.path,
        &options.changelog_file,
        &options.parser,
    ) {
        Ok(changelog) => Some(changelog),
        Err(warning) => {
            warnings.push(warning);
            None
        }
    };

    tracing::debug!(
        project = %project.name,
        releases = tag_metrics.len(),
        unreleased_commits,
        warnings = warnings.len(),
        "project scanned"
    );

    ProjectOutcome {
        scan: ProjectScan {
            name: project.name.clone(),
            path: project.path.clone(),
            tag_metrics,
            unreleased_commits,
            warnings,
        },
        changelog,
    }
}

/// Scan every project and aggregate the results for `period`.
///
/// # Returns
/// * `Ok(MetricsReport)` - Aggregate plus per-project data and warnings
/// * `Err(MetricsError::NoProjects)` - If `projects` is empty
/// * `Err(MetricsError::DuplicateProject)` - If two entries share a name
pub fn collect(
    projects: &[ProjectEntry],
    options: &CollectOptions,
    period: &Period,
) -> Result<MetricsReport> {
    if projects.is_empty() {
        return Err(MetricsError::NoProjects);
    }

    let mut seen = HashSet::new();
    if let Some(duplicate) = projects.iter().find(|p| !seen.insert(p.name.as_str())) {
        return Err(MetricsError::DuplicateProject(duplicate.name.clone()));
    }

    let outcomes: Vec<ProjectOutcome> = projects
        .chunks(options.jobs.max(1))
        .flat_map(|batch| run_batch(batch, options))
        .collect();

    Ok(merge(outcomes, period))
}

/// Fold project outcomes, in order, into the final report
pub fn merge(outcomes: Vec<ProjectOutcome>, period: &Period) -> MetricsReport {
    let mut tag_metrics: BTreeMap<String, Vec<TagMetrics>> = BTreeMap::new();
    let mut changelogs = Vec::new();
    let mut warnings = Vec::new();
    let mut projects = Vec::with_capacity(outcomes.len());

    for outcome in outcomes {
        let name = outcome.scan.name.clone();
        warnings.extend(outcome.scan.warnings.iter().map(|w| format!("{}: {}", name, w)));

        if let Some(changelog) = outcome.changelog {
            warnings.extend(
                changelog
                    .parse_warnings
                    .iter()
                    .map(|w| format!("{}: {}", name, w)),
            );
            changelogs.push(changelog);
        }

        tag_metrics
            .entry(name)
            .or_default()
            .extend(outcome.scan.tag_metrics.iter().cloned());
        projects.push(outcome.scan);
    }

    MetricsReport {
        metrics: aggregate(&changelogs, &tag_metrics, period),
        projects,
        warnings,
    }
}

/// Scan a batch concurrently, each project bounded by `options.timeout`
/// measured from the start of the batch.
fn run_batch(batch: &[ProjectEntry], options: &CollectOptions) -> Vec<ProjectOutcome> {
    run_batch_with(batch, options, collect_project)
}

fn run_batch_with<F>(
    batch: &[ProjectEntry],
    options: &CollectOptions,
    worker: F,
) -> Vec<ProjectOutcome>
where
    F: Fn(&ProjectEntry, &CollectOptions) -> ProjectOutcome + Send + Clone + 'static,
{
    let started = Instant::now();

    let pending: Vec<_> = batch
        .iter()
        .map(|project| {
            let (tx, rx) = mpsc::channel();
            let worker_project = project.clone();
            let worker_options = options.clone();
            let worker = worker.clone();
            let spawned = thread::Builder::new()
                .name(format!("scan-{}", project.name))
                .spawn(move || {
                    // Receiver is gone after a timeout
                    let _ = tx.send(worker(&worker_project, &worker_options));
                });
            (project, spawned.map(|_| rx))
        })
        .collect();

    pending
        .into_iter()
        .map(|(project, receiver)| {
            let rx = match receiver {
                Ok(rx) => rx,
                Err(e) => {
                    return failed_outcome(
                        project,
                        Warning::WorkerFailed {
                            reason: e.to_string(),
                        },
                    )
                }
            };

            let remaining = options.timeout.saturating_sub(started.elapsed());
            match rx.recv_timeout(remaining) {
                Ok(outcome) => outcome,
                Err(RecvTimeoutError::Timeout) => {
                    tracing::warn!(project = %project.name, "project scan timed out");
                    failed_outcome(
                        project,
                        Warning::Timeout {
                            limit: options.timeout,
                        },
                    )
                }
                Err(RecvTimeoutError::Disconnected) => failed_outcome(
                    project,
                    Warning::WorkerFailed {
                        reason: "worker exited without a result".to_string(),
                    },
                ),
            }
        })
        .collect()
}

fn failed_outcome(project: &ProjectEntry, warning: Warning) -> ProjectOutcome {
    ProjectOutcome {
        scan: ProjectScan::failed(project, warning),
        changelog: None,
    }
}
