//! Resource path and schema path construction.
//!
//! Spanner resource paths are only ever assembled from validated
//! identifiers, and schema directories must be relative paths that stay
//! inside the project.

use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::{ValidationError, ValidationResult};
use crate::identifier::{validate_database_id, validate_instance_id, validate_project_id};

const SUSPICIOUS_DSN_PATTERNS: &[&str] = &["..", ";", "&", "|"];
const SUSPICIOUS_PATH_CHARS: &[char] = &[';', '&', '|'];

/// Build `projects/{p}/instances/{i}/databases/{d}` from validated parts.
///
/// Fails on the first invalid component, naming the field. The assembled
/// path is scanned once more for injection sequences before it is returned.
pub fn build_secure_dsn(
    project_id: &str,
    instance_id: &str,
    database_id: &str,
) -> ValidationResult<String> {
    validate_project_id(project_id).map_err(|e| invalid_field("project ID", e))?;
    validate_instance_id(instance_id).map_err(|e| invalid_field("instance ID", e))?;
    validate_database_id(database_id).map_err(|e| invalid_field("database ID", e))?;

    let mut dsn = String::with_capacity(
        "projects//instances//databases/".len()
            + project_id.len()
            + instance_id.len()
            + database_id.len(),
    );
    dsn.push_str("projects/");
    dsn.push_str(project_id);
    dsn.push_str("/instances/");
    dsn.push_str(instance_id);
    dsn.push_str("/databases/");
    dsn.push_str(database_id);

    if SUSPICIOUS_DSN_PATTERNS.iter().any(|p| dsn.contains(p)) {
        return Err(ValidationError::SuspiciousDsn(dsn));
    }

    Ok(dsn)
}

fn invalid_field(field: &'static str, source: ValidationError) -> ValidationError {
    ValidationError::InvalidField {
        field,
        source: Box::new(source),
    }
}

/// Lexically normalise a path: drop `.` components and fold `name/..`
/// pairs. Leading `..` components that cannot be folded are kept.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                // `/..` is still `/`.
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.iter().collect()
}

/// Validate a schema (or seed) directory path.
///
/// The path must be non-empty, relative, free of shell metacharacters,
/// must not contain `..` anywhere once cleaned (`schema..v2` included),
/// and must exist.
pub fn validate_schema_path(path: &Path) -> ValidationResult<()> {
    if path.as_os_str().is_empty() {
        return Err(ValidationError::EmptyPath);
    }

    let cleaned = clean_path(path);
    if cleaned.to_string_lossy().contains("..") {
        return Err(ValidationError::PathTraversalDetected(path.to_path_buf()));
    }

    if path.is_absolute() || path.has_root() {
        return Err(ValidationError::AbsolutePathNotAllowed(path.to_path_buf()));
    }

    if path.to_string_lossy().contains(SUSPICIOUS_PATH_CHARS) {
        return Err(ValidationError::SuspiciousCharacters(path.to_path_buf()));
    }

    match std::fs::metadata(&cleaned) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(ValidationError::PathNotFound(cleaned))
        }
        Err(source) => Err(ValidationError::PathAccessError {
            path: cleaned,
            source,
        }),
    }
}
