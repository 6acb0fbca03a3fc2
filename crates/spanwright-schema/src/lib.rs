//! spanwright-schema — schema files, DDL column maps, and table-name mapping.
//!
//! ```text
//! read_schema_files(dir)            001_users.sql, 002_add_status.sql, …
//!   └── split_sql_statements()      one String per `;`-terminated statement
//! parse_schema_from_ddl(&stmts)
//!   └── classify() → DdlStatement   CreateTable | AlterTableAddColumn | Other
//!         → SchemaMap               table → column → base type
//! convert_table_name(fixture, &schema.table_names())
//! ```
//!
//! Statement order is preserved end to end: later migrations may add
//! columns to tables created by earlier ones.

pub mod ddl;
pub mod error;
pub mod reader;
pub mod reconcile;
pub mod schema_map;

pub use ddl::{ColumnDef, DdlStatement, base_type, classify, parse_schema_from_ddl};
pub use error::{SchemaError, SchemaResult};
pub use reader::{read_schema_files, schema_files, split_sql_statements};
pub use reconcile::{convert_table_name, snake_to_pascal_case};
pub use schema_map::{ColumnMap, SchemaMap};

/// Read and parse the schema at `path` in one step.
pub fn load_schema(path: &std::path::Path) -> SchemaResult<SchemaMap> {
    let statements = read_schema_files(path)?;
    Ok(parse_schema_from_ddl(&statements))
}
