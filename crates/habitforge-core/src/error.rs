//! Core error types for habitforge-core.
//!
//! This module defines the error hierarchy using thiserror. Domain
//! rejections (ownership, duplicate check-in) are kept distinct from
//! infrastructure failures so callers can tell "nothing changed, here's
//! why" apart from "the operation itself broke".

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for habitforge-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Domain-level rejections
    #[error("{0}")]
    Habit(#[from] HabitError),

    /// Notification delivery errors
    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
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

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Missing required configuration key
    #[error("Missing required configuration key: {0}")]
    MissingKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Blank where a value is required
    #[error("'{field}' must not be blank")]
    Blank { field: String },

    /// Value must be a positive integer
    #[error("'{field}' must be positive (got {value})")]
    NotPositive { field: String, value: i64 },

    /// Time-of-day string could not be parsed
    #[error("Invalid reminder time '{input}': expected HH:MM")]
    InvalidTime { input: String },
}

/// Domain rejections for habit operations.
///
/// Not-found and not-owned are distinct variants here even though callers
/// building an outward-facing API may collapse them into one response to
/// avoid leaking existence of other users' habits.
#[derive(Error, Debug)]
pub enum HabitError {
    /// No user with the given username
    #[error("User '{0}' not found")]
    UserNotFound(String),

    /// No habit with the given id
    #[error("Habit {0} not found")]
    HabitNotFound(i64),

    /// The habit exists but belongs to someone else
    #[error("Habit {habit_id} is not owned by '{username}'")]
    NotOwner { habit_id: i64, username: String },

    /// A check-in was already accepted for this date
    #[error("Already checked in today")]
    AlreadyCheckedIn,

    /// The check-in date is earlier than the last accepted check-in
    #[error("Check-in date {attempted} is earlier than last check-in {last}")]
    Backdated {
        attempted: chrono::NaiveDate,
        last: chrono::NaiveDate,
    },

    /// Bad input shape/values
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Storage failure while performing the operation
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Notification delivery errors.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// No delivery endpoint configured
    #[error("No notifier endpoint configured")]
    NotConfigured,

    /// Transport-level failure
    #[error("Delivery failed: {0}")]
    Transport(String),

    /// Endpoint answered with a non-success status
    #[error("Delivery rejected: HTTP {status}")]
    Status { status: u16 },

    /// Send did not complete within the configured timeout
    #[error("Delivery timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
}

// Helper implementations for converting from other error types

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for HabitError {
    fn from(err: rusqlite::Error) -> Self {
        HabitError::Database(DatabaseError::from(err))
    }
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        NotifyError::Transport(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
