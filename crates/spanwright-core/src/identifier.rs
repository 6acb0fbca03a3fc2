//! Spanner resource identifier validation.
//!
//! Project, instance, database, and table/column names are checked against
//! Cloud Spanner naming rules before they are used to build resource paths
//! or spliced into SQL. All validators are pure.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationResult};

static PROJECT_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9-]*[a-z0-9]$").expect("valid project regex"));
static INSTANCE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9-]*$").expect("valid instance regex"));
static DATABASE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_-]*$").expect("valid database regex"));
static TABLE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9_-]*$").expect("valid table regex"));

/// Substrings rejected anywhere in a table or column name (case-insensitive).
///
/// A heuristic, not a parser: `Updates` or `Created` are rejected too.
pub const DANGEROUS_KEYWORDS: &[&str] = &[
    "select",
    "insert",
    "update",
    "delete",
    "drop",
    "create",
    "alter",
    "exec",
    "union",
    "script",
    "javascript",
];

const TRAVERSAL_PATTERNS: &[&str] = &["..", "/", "\\"];

/// The kind of resource an identifier names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdentifierKind {
    Project,
    Instance,
    Database,
    /// Table names; column names share the same rules.
    Table,
}

impl IdentifierKind {
    /// Inclusive length bounds, in characters.
    pub fn length_bounds(self) -> (usize, usize) {
        match self {
            IdentifierKind::Project => (6, 30),
            IdentifierKind::Instance => (2, 64),
            IdentifierKind::Database => (2, 30),
            IdentifierKind::Table => (1, 128),
        }
    }

    fn pattern(self) -> &'static Regex {
        match self {
            IdentifierKind::Project => &PROJECT_ID_RE,
            IdentifierKind::Instance => &INSTANCE_ID_RE,
            IdentifierKind::Database => &DATABASE_ID_RE,
            IdentifierKind::Table => &TABLE_NAME_RE,
        }
    }
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentifierKind::Project => write!(f, "project ID"),
            IdentifierKind::Instance => write!(f, "instance ID"),
            IdentifierKind::Database => write!(f, "database ID"),
            IdentifierKind::Table => write!(f, "table name"),
        }
    }
}

/// Validate `value` as an identifier of the given kind.
///
/// Checks run in a fixed order and the first failure is returned:
/// empty, path traversal, length, character set, then (tables only)
/// dangerous keywords.
pub fn validate_identifier(kind: IdentifierKind, value: &str) -> ValidationResult<()> {
    if value.is_empty() {
        return Err(ValidationError::EmptyIdentifier { kind });
    }

    // Reported ahead of the charset check so traversal attempts are always
    // classified as such, whatever else is wrong with the string.
    if TRAVERSAL_PATTERNS.iter().any(|p| value.contains(p)) {
        return Err(ValidationError::PathTraversal {
            kind,
            value: value.to_string(),
        });
    }

    let (min, max) = kind.length_bounds();
    let len = value.chars().count();
    if len < min || len > max {
        return Err(ValidationError::LengthOutOfRange { kind, len, min, max });
    }

    if !kind.pattern().is_match(value) {
        return Err(ValidationError::InvalidCharacters {
            kind,
            value: value.to_string(),
        });
    }

    if kind == IdentifierKind::Table
        && let Some(keyword) = find_dangerous_keyword(value)
    {
        return Err(ValidationError::DangerousKeyword {
            kind,
            value: value.to_string(),
            keyword,
        });
    }

    Ok(())
}

/// Validate a GCP project ID.
pub fn validate_project_id(value: &str) -> ValidationResult<()> {
    validate_identifier(IdentifierKind::Project, value)
}

/// Validate a Spanner instance ID.
pub fn validate_instance_id(value: &str) -> ValidationResult<()> {
    validate_identifier(IdentifierKind::Instance, value)
}

/// Validate a Spanner database ID.
pub fn validate_database_id(value: &str) -> ValidationResult<()> {
    validate_identifier(IdentifierKind::Database, value)
}

/// Validate a table or column name.
pub fn validate_table_name(value: &str) -> ValidationResult<()> {
    validate_identifier(IdentifierKind::Table, value)
}

fn find_dangerous_keyword(value: &str) -> Option<&'static str> {
    let lower = value.to_lowercase();
    DANGEROUS_KEYWORDS
        .iter()
        .copied()
        .find(|keyword| lower.contains(keyword))
}
