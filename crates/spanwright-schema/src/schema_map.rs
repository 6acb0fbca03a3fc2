//! Table → column → base type map derived from DDL.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Column name → base SQL type (`STRING`, `INT64`, `ARRAY`, …).
pub type ColumnMap = BTreeMap<String, String>;

/// Every table and column the schema declares.
///
/// Built once per schema directory by [`crate::parse_schema_from_ddl`] and
/// read-only afterwards. Table and column names keep the casing used in DDL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaMap {
    tables: BTreeMap<String, ColumnMap>,
}

impl SchemaMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table with no columns, keeping any columns it already has.
    pub(crate) fn ensure_table(&mut self, table: &str) -> &mut ColumnMap {
        self.tables.entry(table.to_string()).or_default()
    }

    pub(crate) fn insert_column(&mut self, table: &str, column: &str, base_type: &str) {
        self.ensure_table(table)
            .insert(column.to_string(), base_type.to_string());
    }

    pub fn contains_table(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    /// Columns of `table`, if it exists (exact name).
    pub fn columns(&self, table: &str) -> Option<&ColumnMap> {
        self.tables.get(table)
    }

    /// Base type of `table.column`, if both exist.
    pub fn column_type(&self, table: &str, column: &str) -> Option<&str> {
        self.tables
            .get(table)
            .and_then(|cols| cols.get(column))
            .map(String::as_str)
    }

    /// Table names in sorted order.
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnMap)> {
        self.tables.iter().map(|(name, cols)| (name.as_str(), cols))
    }
}
