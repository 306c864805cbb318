pub mod aggregate;
pub mod changelog;
pub mod config;
pub mod diff;
pub mod domain;
pub mod error;
pub mod git;
pub mod pipeline;
pub mod tags;
pub mod ui;
pub mod warning;

pub use error::{MetricsError, Result};
