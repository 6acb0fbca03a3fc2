//! Turn fixture rows into mutations against the real schema.
//!
//! Fixture files name tables and columns loosely (`user_profiles`,
//! `user_id`); both are reconciled against the parsed [`SchemaMap`] before
//! a mutation is built, so nothing the schema does not declare is written.

use serde_json::Value;
use spanwright_schema::{SchemaMap, convert_table_name};
use tracing::debug;

use crate::client::Mutation;
use crate::error::{DbError, DbResult};

/// Fixture row: column name → value.
pub type FixtureRow = serde_json::Map<String, Value>;

/// Resolve a fixture table name to the schema's table name.
pub fn resolve_table(schema: &SchemaMap, fixture_table: &str) -> DbResult<String> {
    let tables = schema.table_names();
    let resolved = convert_table_name(fixture_table, &tables);
    if !schema.contains_table(&resolved) {
        return Err(DbError::UnknownTable(fixture_table.to_string()));
    }
    Ok(resolved)
}

/// Build an insert-or-update mutation for one fixture row.
///
/// Columns keep the row's key order (sorted, as `serde_json::Map` stores
/// them).
pub fn build_insert(schema: &SchemaMap, fixture_table: &str, row: &FixtureRow) -> DbResult<Mutation> {
    let table = resolve_table(schema, fixture_table)?;
    let declared: Vec<&str> = schema
        .columns(&table)
        .map(|cols| cols.keys().map(String::as_str).collect())
        .unwrap_or_default();

    let mut columns = Vec::with_capacity(row.len());
    let mut values = Vec::with_capacity(row.len());
    for (name, value) in row {
        let column = convert_table_name(name, &declared);
        if !declared.contains(&column.as_str()) {
            return Err(DbError::UnknownColumn {
                table: table.clone(),
                column: name.clone(),
            });
        }
        columns.push(column);
        values.push(value.clone());
    }

    Ok(Mutation::insert_or_update(table, columns, values))
}

/// Build mutations for every row of one fixture table.
pub fn build_inserts(schema: &SchemaMap, fixture_table: &str, rows: &[FixtureRow]) -> DbResult<Vec<Mutation>> {
    let mutations = rows
        .iter()
        .map(|row| build_insert(schema, fixture_table, row))
        .collect::<DbResult<Vec<_>>>()?;
    debug!(table = fixture_table, rows = mutations.len(), "built fixture mutations");
    Ok(mutations)
}
