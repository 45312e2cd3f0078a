//! Error types for the binding layer
//!
//! This module defines all error types that can occur while opening connections,
//! preparing statements, binding parameters and reading columns.

use super::state::State;

/// Result type alias for database operations
pub type Result<T> = std::result::Result<T, DatabaseError>;

/// Error types for database operations
///
/// Variants fall into two groups. Usage errors are detected locally, before any
/// engine call is made. Engine errors carry the SQLite result code and message.
/// A column holding a value of the wrong storage class is not an error at all:
/// typed reads return `Ok(None)` for it.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Connection error (not connected, already connected, bad properties)
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Operation attempted in a statement state that does not allow it
    #[error("Invalid state: cannot {operation} while the statement is {state}")]
    InvalidState {
        operation: &'static str,
        state: State,
    },

    /// Column read attempted while no row is available
    #[error("No row available (statement is {state})")]
    NoRow { state: State },

    /// Statement has no prepared query
    #[error("Statement has no prepared query")]
    EmptyStatement,

    /// Parameter index outside `1..=count`
    #[error("Bad parameter index {index} (statement has {count} parameters)")]
    ParameterIndex { index: usize, count: usize },

    /// Named parameter not present in the prepared query
    #[error("Bad parameter name {0}")]
    ParameterName(String),

    /// Column index outside `0..count`
    #[error("Bad column index {index} (statement has {count} columns)")]
    ColumnIndex { index: usize, count: usize },

    /// Value cannot be represented by the engine
    #[error("Value out of range: {0}")]
    OutOfRange(String),

    /// Non-success status reported by SQLite
    #[error("SQLite error {code}: {message}")]
    Engine { code: i32, message: String },

    /// Query execution error raised by a row callback or helper
    #[error("Query execution error: {0}")]
    QueryError(String),

    /// JSON serialization error
    #[cfg(feature = "json")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl DatabaseError {
    /// Create a new connection error
    pub fn connection<S: Into<String>>(msg: S) -> Self {
        DatabaseError::ConnectionError(msg.into())
    }

    /// Create an invalid state error
    pub fn invalid_state(operation: &'static str, state: State) -> Self {
        DatabaseError::InvalidState { operation, state }
    }

    /// Create a new query error
    pub fn query<S: Into<String>>(msg: S) -> Self {
        DatabaseError::QueryError(msg.into())
    }

    /// Create an out-of-range error
    pub fn out_of_range<S: Into<String>>(msg: S) -> Self {
        DatabaseError::OutOfRange(msg.into())
    }

    /// Create an engine error from a result code and message
    pub fn engine<S: Into<String>>(code: i32, message: S) -> Self {
        DatabaseError::Engine {
            code,
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        DatabaseError::Other(msg.into())
    }

    /// SQLite result code, if the error came from the engine
    pub fn code(&self) -> Option<i32> {
        match self {
            DatabaseError::Engine { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// True for errors detected locally before any engine call
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            DatabaseError::ConnectionError(_)
                | DatabaseError::InvalidState { .. }
                | DatabaseError::NoRow { .. }
                | DatabaseError::EmptyStatement
                | DatabaseError::ParameterIndex { .. }
                | DatabaseError::ParameterName(_)
                | DatabaseError::ColumnIndex { .. }
                | DatabaseError::OutOfRange(_)
        )
    }
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(failure, message) => DatabaseError::Engine {
                code: failure.extended_code,
                message: message.unwrap_or_else(|| failure.to_string()),
            },
            rusqlite::Error::SqlInputError {
                error, msg, offset, ..
            } => DatabaseError::Engine {
                code: error.extended_code,
                message: format!("{} at offset {}", msg, offset),
            },
            other => DatabaseError::Other(other.to_string()),
        }
    }
}
