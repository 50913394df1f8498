//! Error type for timesheet operations.

use thiserror::Error;

/// Errors surfaced to the caller of the timesheet engine.
///
/// Tolerant inputs (unknown sort, period or period type tokens) never produce
/// an error; they fall back to defaults at the option boundary.
#[derive(Debug, Error)]
pub enum TimesheetError {
    /// An explicitly supplied date could not be parsed.
    #[error("invalid {field}: {value:?} (expected YYYY-MM-DD)")]
    InvalidDate {
        field: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// The entry repository or directory failed.
    #[error("repository error: {0}")]
    Repository(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Writing the tabular export failed.
    #[error("export failed: {0}")]
    Export(#[from] csv::Error),

    /// An I/O error while writing output.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl TimesheetError {
    /// Wraps a persistence-layer failure.
    pub fn repository(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Repository(err.into())
    }
}
