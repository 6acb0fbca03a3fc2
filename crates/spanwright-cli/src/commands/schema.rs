use std::fmt::Write as _;
use std::path::Path;

use anyhow::bail;
use spanwright_schema::SchemaMap;
use tracing::info;

pub fn show(path: &str, format: &str) -> anyhow::Result<()> {
    let schema = load(path)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
        _ => {
            print!("{}", format_schema(&schema));
        }
    }

    Ok(())
}

pub fn resolve(name: &str, path: &str) -> anyhow::Result<()> {
    let schema = load(path)?;
    let resolved = spanwright_schema::convert_table_name(name, &schema.table_names());

    if !schema.contains_table(&resolved) {
        bail!("no table in {path} matches {name:?}");
    }
    info!("Resolved {} to table {}", name, resolved);
    println!("{resolved}");
    Ok(())
}

fn load(path: &str) -> anyhow::Result<SchemaMap> {
    let path = Path::new(path);
    spanwright_core::validate_schema_path(path)?;
    info!("Loading schema from {}", path.display());
    let schema = spanwright_schema::load_schema(path)?;
    info!("Found {} tables", schema.len());
    Ok(schema)
}

/// One block per table, columns indented beneath it.
pub fn format_schema(schema: &SchemaMap) -> String {
    if schema.is_empty() {
        return "(no tables)\n".to_string();
    }

    let mut out = String::new();
    for (table, columns) in schema.iter() {
        let _ = writeln!(out, "{table}");
        let width = columns.keys().map(String::len).max().unwrap_or(0);
        for (column, ty) in columns {
            let _ = writeln!(out, "  {column:<width$}  {ty}");
        }
    }
    out
}
