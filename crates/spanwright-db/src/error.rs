//! Error types for database operations.

use spanwright_core::{ConfigError, ValidationError};
use thiserror::Error;
use tonic::{Code, Status};

/// Result type alias for database operations.
pub type DbResult<T> = Result<T, DbError>;

/// Errors surfaced by the executor and the helpers built on it.
#[derive(Debug, Error)]
pub enum DbError {
    /// The caller cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,

    /// The caller's deadline passed before the operation finished.
    #[error("operation deadline exceeded")]
    DeadlineExceeded,

    /// Spanner (or the emulator) returned an error status.
    #[error("spanner error: {}: {}", .0.code(), .0.message())]
    Backend(#[from] Status),

    #[error("max retry attempts ({attempts}) exceeded for {operation}: {source}")]
    RetriesExhausted {
        operation: String,
        attempts: u32,
        #[source]
        source: Box<DbError>,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("table {0:?} not found in schema")]
    UnknownTable(String),

    #[error("column {column:?} not found in table {table:?}")]
    UnknownColumn { table: String, column: String },

    #[error("table {table}: expected {expected} rows, found {actual}")]
    RowCountMismatch {
        table: String,
        expected: i64,
        actual: i64,
    },

    #[error("unexpected query result: {0}")]
    UnexpectedResult(String),
}

impl DbError {
    /// Backend status code, if this is a backend error.
    pub fn code(&self) -> Option<Code> {
        match self {
            DbError::Backend(status) => Some(status.code()),
            _ => None,
        }
    }

    /// Whether the error came from the caller's context rather than the backend.
    pub fn is_context_error(&self) -> bool {
        matches!(self, DbError::Cancelled | DbError::DeadlineExceeded)
    }
}
