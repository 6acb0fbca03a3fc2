//! Schema file discovery and statement splitting.
//!
//! A schema path is either a single `.sql` file or a directory of
//! migrations. Numbered migrations (`001_users.sql`, `002_orders.sql`) are
//! read in lexicographic order, so numbers must be zero-padded; a directory
//! without any falls back to `schema.sql`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{SchemaError, SchemaResult};

const FALLBACK_SCHEMA_FILE: &str = "schema.sql";

/// Read every DDL statement under `path`, in application order.
///
/// An empty result is legal (a schema that has not been written yet) and
/// only logged.
pub fn read_schema_files(path: &Path) -> SchemaResult<Vec<String>> {
    let files = schema_files(path)?;

    let mut statements = Vec::new();
    for file in &files {
        let content = fs::read_to_string(file).map_err(|source| SchemaError::Io {
            path: file.clone(),
            source,
        })?;
        let parsed = split_sql_statements(&content);
        debug!(file = %file.display(), statements = parsed.len(), "read schema file");
        statements.extend(parsed);
    }

    if statements.is_empty() {
        warn!(path = %path.display(), "no DDL statements found");
    }

    Ok(statements)
}

/// Resolve the ordered list of schema files for `path`.
pub fn schema_files(path: &Path) -> SchemaResult<Vec<PathBuf>> {
    let metadata = fs::metadata(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            SchemaError::NotFound(path.to_path_buf())
        } else {
            SchemaError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    if !metadata.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut migrations = Vec::new();
    for entry in WalkDir::new(path).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|source| SchemaError::Walk {
            path: path.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if is_migration_file(name) {
            migrations.push((name.to_string(), entry.into_path()));
        }
    }

    if !migrations.is_empty() {
        migrations.sort_by(|a, b| a.0.cmp(&b.0));
        return Ok(migrations.into_iter().map(|(_, p)| p).collect());
    }

    let fallback = path.join(FALLBACK_SCHEMA_FILE);
    if fallback.is_file() {
        return Ok(vec![fallback]);
    }

    Err(SchemaError::NoSchemaFilesFound(path.to_path_buf()))
}

fn is_migration_file(name: &str) -> bool {
    name.ends_with(".sql") && name.starts_with(|c: char| c.is_ascii_digit())
}

/// Split SQL text into statements on `;`.
///
/// Blank lines and lines starting with `--` or `/*` are dropped from each
/// statement; statements left empty are discarded. Semicolons inside string
/// literals are not special-cased.
pub fn split_sql_statements(content: &str) -> Vec<String> {
    content
        .split(';')
        .filter_map(|raw| {
            let lines: Vec<&str> = raw
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !is_comment_line(line))
                .collect();
            if lines.is_empty() {
                None
            } else {
                Some(lines.join("\n"))
            }
        })
        .collect()
}

pub(crate) fn is_comment_line(line: &str) -> bool {
    line.starts_with("--") || line.starts_with("/*")
}
