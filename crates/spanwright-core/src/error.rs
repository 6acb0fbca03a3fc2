//! Error types for identifier, path, and configuration validation.

use std::path::PathBuf;

use thiserror::Error;

use crate::identifier::IdentifierKind;

/// Result type alias for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Result type alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// A single identifier or path failed validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{kind} cannot be empty")]
    EmptyIdentifier { kind: IdentifierKind },

    #[error("{kind} must be between {min} and {max} characters, got {len}")]
    LengthOutOfRange {
        kind: IdentifierKind,
        len: usize,
        min: usize,
        max: usize,
    },

    #[error("{kind} {value:?} contains invalid characters")]
    InvalidCharacters { kind: IdentifierKind, value: String },

    #[error("{kind} {value:?} contains path traversal sequences")]
    PathTraversal { kind: IdentifierKind, value: String },

    #[error("{kind} {value:?} contains dangerous keyword {keyword:?}")]
    DangerousKeyword {
        kind: IdentifierKind,
        value: String,
        keyword: &'static str,
    },

    #[error("invalid {field}: {source}")]
    InvalidField {
        field: &'static str,
        #[source]
        source: Box<ValidationError>,
    },

    #[error("resource path {0:?} contains suspicious sequences")]
    SuspiciousDsn(String),

    #[error("schema path cannot be empty")]
    EmptyPath,

    #[error("path {} contains path traversal sequences", .0.display())]
    PathTraversalDetected(PathBuf),

    #[error("absolute paths are not allowed: {}", .0.display())]
    AbsolutePathNotAllowed(PathBuf),

    #[error("path {} contains suspicious characters", .0.display())]
    SuspiciousCharacters(PathBuf),

    #[error("path does not exist: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("cannot access path {}: {source}", path.display())]
    PathAccessError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ValidationError {
    /// Whether this error belongs to the path-traversal class, for
    /// identifiers as well as filesystem paths.
    pub fn is_path_traversal(&self) -> bool {
        match self {
            ValidationError::PathTraversal { .. } | ValidationError::PathTraversalDetected(_) => true,
            ValidationError::InvalidField { source, .. } => source.is_path_traversal(),
            _ => false,
        }
    }
}

/// Configuration could not be loaded or violates the emulator-only policy.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required setting {0} is missing")]
    MissingField(&'static str),

    #[error("invalid {field}: {source}")]
    InvalidIdentifier {
        field: &'static str,
        #[source]
        source: ValidationError,
    },

    #[error("invalid {field}: {source}")]
    InvalidSchemaPath {
        field: &'static str,
        #[source]
        source: ValidationError,
    },

    #[error("emulator host {0:?} is not local; only localhost or 127.0.0.1 are allowed")]
    ProductionHostRejected(String),

    #[error("{field} {value:?} looks like a production resource (matches {pattern:?})")]
    ProductionLikeIdentifier {
        field: &'static str,
        value: String,
        pattern: &'static str,
    },

    #[error("environment {0:?} is production-like and not allowed")]
    ProductionEnvironment(String),

    #[error("unknown environment {0:?}; expected development, test, or staging")]
    InvalidEnvironment(String),

    #[error("invalid timeout {0:?}; expected whole seconds between 1 and 3600")]
    InvalidTimeout(String),

    #[error("failed to load .env file: {0}")]
    DotEnv(#[from] dotenvy::Error),
}
