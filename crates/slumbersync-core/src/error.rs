//! Core error types for slumbersync-core.
//!
//! This module defines the error hierarchy used across the library.
//! Advice-generation failures live in [`crate::advice::AdviceError`] because
//! they never cross the advice boundary.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Core error type for slumbersync-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Submitted values were rejected before reaching storage
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The backfill gate refused the submission
    #[error("{0}")]
    Gate(#[from] GateError),

    /// No user is logged in
    #[error("Not logged in. Run `slumbersync auth login <email>` first.")]
    NotLoggedIn,

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A stored row could not be decoded
    #[error("Corrupt row in {table}: {message}")]
    CorruptRow { table: String, message: String },

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Could not determine or create the data directory
    #[error("Cannot use data directory {path}: {message}")]
    DataDir { path: PathBuf, message: String },

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Keyring access failed
    #[error("Keyring error: {0}")]
    Keyring(String),
}

/// Validation errors for user-submitted sleep data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Input could not be parsed as a number
    #[error("'{input}' is not a number of hours")]
    NotANumber { input: String },

    /// Parsed value is negative, NaN or infinite
    #[error("Hours must be a finite, non-negative number (got {0})")]
    OutOfRange(f64),

    /// Backfill left some gap dates without a value
    #[error("Please fill in all missing days first: {}", format_dates(.0))]
    IncompleteBackfill(Vec<NaiveDate>),

    /// Backfill named dates that are not pending gaps
    #[error("Not missing days: {}", format_dates(.0))]
    UnexpectedDates(Vec<NaiveDate>),

    /// A date string could not be parsed
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    /// Login without an email
    #[error("Email must not be empty")]
    EmptyEmail,
}

/// Rejections issued by the backfill gate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GateError {
    /// Today's entry is blocked until the listed gaps are filled
    #[error("You can't log today's sleep until you fill in the gaps: {}", format_dates(.gaps))]
    Blocked { gaps: Vec<NaiveDate> },

    /// A backfill was submitted but there are no gaps
    #[error("There are no missing days to fill in")]
    NothingToBackfill,
}

fn format_dates(dates: &[NaiveDate]) -> String {
    dates
        .iter()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked
                    || e.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn gate_error_lists_gap_dates() {
        let err = GateError::Blocked {
            gaps: vec![d("2024-01-02"), d("2024-01-03")],
        };
        assert_eq!(
            err.to_string(),
            "You can't log today's sleep until you fill in the gaps: 2024-01-02, 2024-01-03"
        );
    }

    #[test]
    fn incomplete_backfill_message() {
        let err = ValidationError::IncompleteBackfill(vec![d("2024-03-09")]);
        assert!(err.to_string().contains("2024-03-09"));
        assert!(err.to_string().starts_with("Please fill in all missing days"));
    }

    #[test]
    fn locked_sqlite_maps_to_locked() {
        let err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        );
        assert!(matches!(DatabaseError::from(err), DatabaseError::Locked));
    }
}
