//! Error types for schema reading.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised while locating or reading schema files.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("schema path does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("no schema files found in {} (expected numbered *.sql migrations or schema.sql)", .0.display())]
    NoSchemaFilesFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to list {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}
