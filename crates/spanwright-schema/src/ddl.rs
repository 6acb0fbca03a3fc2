//! Line-oriented DDL classification.
//!
//! Only the two shapes that fixture tooling cares about are understood:
//! `CREATE TABLE` blocks with one column per line, and
//! `ALTER TABLE … ADD COLUMN`. Everything else (indexes, change streams,
//! drops) is classified as [`DdlStatement::Other`] and ignored. This is a
//! heuristic over hand-written migration files, not a SQL grammar.

use tracing::debug;

use crate::reader::is_comment_line;
use crate::schema_map::SchemaMap;

/// Lines inside a `CREATE TABLE` block that never declare a column.
const NON_COLUMN_PREFIXES: &[&str] = &[
    "CREATE TABLE",
    "PRIMARY KEY",
    "CREATE INDEX",
    "ALTER TABLE",
    "CONSTRAINT",
    "FOREIGN KEY",
];

const ADD_COLUMN: &str = "ADD COLUMN";

/// A column as declared in DDL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    /// Upper-cased base type without length or element parameters.
    pub base_type: String,
}

/// What a single DDL statement does to the table map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DdlStatement {
    CreateTable {
        table: String,
        columns: Vec<ColumnDef>,
    },
    AlterTableAddColumn {
        table: String,
        column: ColumnDef,
    },
    Other,
}

/// Classify one statement (without its trailing `;`).
pub fn classify(statement: &str) -> DdlStatement {
    let upper = statement.to_ascii_uppercase();
    if upper.contains("CREATE TABLE") {
        parse_create_table(statement).unwrap_or(DdlStatement::Other)
    } else if upper.contains("ALTER TABLE") && upper.contains(ADD_COLUMN) {
        parse_alter_add_column(statement).unwrap_or(DdlStatement::Other)
    } else {
        DdlStatement::Other
    }
}

/// Build the table/column map from statements in application order.
///
/// `ADD COLUMN` on a table that no earlier statement created still
/// registers the table.
pub fn parse_schema_from_ddl<S: AsRef<str>>(statements: &[S]) -> SchemaMap {
    let mut schema = SchemaMap::new();
    for statement in statements {
        match classify(statement.as_ref()) {
            DdlStatement::CreateTable { table, columns } => {
                schema.ensure_table(&table);
                for column in columns {
                    schema.insert_column(&table, &column.name, &column.base_type);
                }
            }
            DdlStatement::AlterTableAddColumn { table, column } => {
                schema.insert_column(&table, &column.name, &column.base_type);
            }
            DdlStatement::Other => {}
        }
    }
    debug!(tables = schema.len(), "parsed schema from DDL");
    schema
}

/// Reduce a declared type to its base form.
///
/// `STRING(36)` → `STRING`, `ARRAY<STRING(MAX)>` → `ARRAY`,
/// `int64,` → `INT64`.
pub fn base_type(raw: &str) -> String {
    let cut = raw.find(['(', '<']).unwrap_or(raw.len());
    raw[..cut]
        .trim_end_matches([',', ';'])
        .trim()
        .to_uppercase()
}

fn parse_create_table(statement: &str) -> Option<DdlStatement> {
    let mut lines = statement.lines().map(str::trim);

    let header = lines.find(|line| line.to_ascii_uppercase().contains("CREATE TABLE"))?;
    let table = name_after(header, "CREATE TABLE")?;

    let mut columns = Vec::new();
    for line in lines {
        if line.is_empty() || is_comment_line(line) {
            continue;
        }
        // The column block ends here; INTERLEAVE and ROW DELETION POLICY
        // clauses follow it.
        if line.starts_with(')') {
            break;
        }
        if starts_with_keyword(line) {
            continue;
        }
        if let Some(column) = column_from_tokens(line.split_whitespace()) {
            columns.push(column);
        }
    }

    Some(DdlStatement::CreateTable { table, columns })
}

/// Whether `line` opens with one of [`NON_COLUMN_PREFIXES`] as whole
/// words, so `ConstraintType STRING(20)` is still a column.
fn starts_with_keyword(line: &str) -> bool {
    NON_COLUMN_PREFIXES.iter().any(|prefix| {
        let mut tokens = line.split(|c: char| c.is_whitespace() || c == '(');
        prefix
            .split_whitespace()
            .all(|word| tokens.next().is_some_and(|t| t.eq_ignore_ascii_case(word)))
    })
}

fn parse_alter_add_column(statement: &str) -> Option<DdlStatement> {
    let header = statement
        .lines()
        .map(str::trim)
        .find(|line| line.to_ascii_uppercase().starts_with("ALTER TABLE"))?;
    let table = name_after(header, "ALTER TABLE")?;

    let upper = statement.to_ascii_uppercase();
    let start = upper.find(ADD_COLUMN)? + ADD_COLUMN.len();
    let mut tokens = statement[start..].split_whitespace().peekable();
    if tokens.peek().is_some_and(|t| t.eq_ignore_ascii_case("IF")) {
        // IF NOT EXISTS
        tokens.nth(2);
    }
    let column = column_from_tokens(tokens)?;

    Some(DdlStatement::AlterTableAddColumn { table, column })
}

/// The object name following `keyword` on `line`, skipping `IF NOT EXISTS`.
fn name_after(line: &str, keyword: &str) -> Option<String> {
    let start = line.to_ascii_uppercase().find(keyword)? + keyword.len();
    let mut tokens = line[start..].split_whitespace().peekable();
    if tokens.peek().is_some_and(|t| t.eq_ignore_ascii_case("IF")) {
        tokens.nth(2);
    }
    let name = tokens.next()?;
    let name = name.split('(').next().unwrap_or(name).trim_matches('`');
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

fn column_from_tokens<'a>(mut tokens: impl Iterator<Item = &'a str>) -> Option<ColumnDef> {
    let name = tokens.next()?.trim_matches('`');
    let raw_type = tokens.next()?;
    let base = base_type(raw_type);
    if name.is_empty() || base.is_empty() {
        return None;
    }
    Some(ColumnDef {
        name: name.to_string(),
        base_type: base,
    })
}
