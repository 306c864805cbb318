use thiserror::Error;

/// Unified error type for release-metrics operations
#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid period: {0}")]
    Period(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("No projects supplied")]
    NoProjects,

    #[error("Duplicate project name: {0}")]
    DuplicateProject(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results in release-metrics
pub type Result<T> = std::result::Result<T, MetricsError>;

impl MetricsError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        MetricsError::Config(msg.into())
    }

    /// Create a period error with context
    pub fn period(msg: impl Into<String>) -> Self {
        MetricsError::Period(msg.into())
    }

    /// Create a repository error with context
    pub fn repository(msg: impl Into<String>) -> Self {
        MetricsError::Repository(msg.into())
    }
}
