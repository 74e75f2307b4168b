use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while parsing calendar values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    /// The string is not three `-`-separated integers.
    #[error("malformed ISO date '{0}', expected YYYY-MM-DD")]
    Malformed(String),
    /// The components parse but do not name a real calendar day.
    #[error("'{0}' is not a valid calendar date")]
    OutOfRange(String),
    /// The string is not a 24-hour `HH:mm` time.
    #[error("malformed time '{0}', expected HH:mm")]
    MalformedTime(String),
}

/// Errors raised by durable-state backends.
///
/// These never escape [`crate::store::TaskStore`]: hydration falls back to the
/// seed collection and persistence is best-effort.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid task data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("storage is unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors surfaced to the user by task operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("task {0} not found")]
    NotFound(String),
    #[error("task title must not be empty")]
    EmptyTitle,
    #[error("the task store has not finished loading")]
    NotReady,
    #[error(transparent)]
    Date(#[from] DateError),
    #[error("invalid value for {field}: '{value}'")]
    InvalidValue { field: &'static str, value: String },
}
