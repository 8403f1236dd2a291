//! Error types for shift-roster.
//!
//! Under-staffing is never an error; it is reported through
//! [`crate::schedule::ScheduleGrid::shortfalls`]. Everything here is about
//! rejecting bad input before a run starts.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Roster failed validation at construction time
    #[error("Invalid roster: {0}")]
    Roster(#[from] RosterError),

    /// Rules or configuration file are unusable
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Roster input could not be read
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// IO errors outside of loading (report/export writes)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON export failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV export failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Reasons a roster is rejected before assignment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    #[error("roster is empty")]
    Empty,

    #[error("employee at position {position} has a blank name")]
    BlankName { position: usize },

    #[error("duplicate employee name: {0}")]
    DuplicateName(String),

    #[error("roster has {actual} employees but a single shift needs {required}")]
    TooSmall { required: usize, actual: usize },

    #[error("ranking for {employee} on {day} must list each shift exactly once, got [{ranking}]")]
    InvalidRanking {
        employee: String,
        day: String,
        ranking: String,
    },
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl ConfigError {
    pub(crate) fn invalid(key: &str, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// Errors raised while reading roster input files.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV input has no 'name' column")]
    MissingNameColumn,

    #[error("line {line}: unknown shift '{value}'")]
    UnknownShift { line: usize, value: String },
}

/// Result type alias for [`Error`]
pub type Result<T, E = Error> = std::result::Result<T, E>;
