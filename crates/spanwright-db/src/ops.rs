//! Retried database operations used by seeding and validation tools.

use serde_json::Value;
use spanwright_core::config::is_local_host;
use spanwright_core::{Config, ConfigError, DatabaseConfig, validate_table_name};
use tonic::Code;
use tracing::{debug, info, warn};

use crate::client::{ClientFactory, Mutation, Row, SpannerClient, Statement};
use crate::context::OpContext;
use crate::error::{DbError, DbResult};
use crate::retry::with_retry;

/// Open a client for `database` through the configured emulator.
///
/// The resource path is built from validated identifiers before the
/// factory sees anything, and the emulator host is re-checked.
pub async fn open_client<F: ClientFactory>(
    ctx: &OpContext,
    factory: &F,
    config: &Config,
    database: &DatabaseConfig,
) -> DbResult<F::Client> {
    if !is_local_host(&config.emulator_host) {
        return Err(ConfigError::ProductionHostRejected(config.emulator_host.clone()).into());
    }
    let path = database.resource_path()?;
    let path = path.as_str();
    let host = config.emulator_host.as_str();

    info!(database = %path, emulator = %host, "opening spanner client");
    with_retry(ctx, "open_client", |_| async move {
        factory.connect(host, path).await.map_err(DbError::from)
    })
    .await
}

/// Apply mutations with retry.
///
/// An empty batch succeeds without touching the client. `AlreadyExists`
/// counts as success so seeding can be re-run over partially seeded data.
pub async fn apply_mutations<C: SpannerClient + ?Sized>(
    ctx: &OpContext,
    client: &C,
    mutations: &[Mutation],
) -> DbResult<()> {
    if mutations.is_empty() {
        debug!("no mutations to apply");
        return Ok(());
    }

    let result = with_retry(ctx, "apply_mutations", |_| async move {
        client.apply(mutations).await.map_err(DbError::from)
    })
    .await;

    match result {
        Err(err) if err.code() == Some(Code::AlreadyExists) => {
            warn!(
                mutations = mutations.len(),
                error = %err,
                "rows already exist, treating as success"
            );
            Ok(())
        }
        Ok(()) => {
            debug!(mutations = mutations.len(), "mutations applied");
            Ok(())
        }
        Err(err) => Err(err),
    }
}

/// Apply schema DDL in order, with retry.
pub async fn apply_schema<C: SpannerClient + ?Sized>(
    ctx: &OpContext,
    client: &C,
    statements: &[String],
) -> DbResult<()> {
    if statements.is_empty() {
        warn!("no DDL statements to apply");
        return Ok(());
    }

    with_retry(ctx, "update_ddl", |_| async move {
        client.update_ddl(statements).await.map_err(DbError::from)
    })
    .await?;
    info!(statements = statements.len(), "schema applied");
    Ok(())
}

/// Run a query with retry and return all rows.
pub async fn query_rows<C: SpannerClient + ?Sized>(
    ctx: &OpContext,
    client: &C,
    statement: &Statement,
) -> DbResult<Vec<Row>> {
    with_retry(ctx, "query", |_| async move {
        client.query(statement).await.map_err(DbError::from)
    })
    .await
}

/// `SELECT COUNT(*)` over `table`.
///
/// The table name is validated before it is spliced into the SQL text.
pub async fn count_rows<C: SpannerClient + ?Sized>(
    ctx: &OpContext,
    client: &C,
    table: &str,
) -> DbResult<i64> {
    validate_table_name(table)?;

    let mut sql = String::from("SELECT COUNT(*) AS count FROM ");
    sql.push_str(table);
    let rows = query_rows(ctx, client, &Statement::new(sql)).await?;

    let value = rows
        .first()
        .and_then(|row| row.get("count").or_else(|| row.values().next()))
        .ok_or_else(|| DbError::UnexpectedResult(format!("count query on {table} returned no rows")))?;
    parse_count(value)
        .ok_or_else(|| DbError::UnexpectedResult(format!("count for {table} is not an integer: {value}")))
}

/// Assert that `table` holds exactly `expected` rows.
pub async fn expect_row_count<C: SpannerClient + ?Sized>(
    ctx: &OpContext,
    client: &C,
    table: &str,
    expected: i64,
) -> DbResult<()> {
    let actual = count_rows(ctx, client, table).await?;
    if actual != expected {
        return Err(DbError::RowCountMismatch {
            table: table.to_string(),
            expected,
            actual,
        });
    }
    debug!(table, rows = actual, "row count matches");
    Ok(())
}

/// Spanner returns INT64 as a JSON string; accept numbers too.
fn parse_count(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
