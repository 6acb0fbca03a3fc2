//! The seam between the tooling and a Spanner client.
//!
//! The executor never talks gRPC itself. A concrete client (the official
//! SDK against the emulator, or a test double) implements
//! [`SpannerClient`], and a [`ClientFactory`] opens one per database path.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tonic::Status;

/// A result row: column name → value.
pub type Row = serde_json::Map<String, Value>;

/// How a mutation writes its row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationKind {
    Insert,
    Update,
    InsertOrUpdate,
    Replace,
}

/// A single-row write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mutation {
    pub kind: MutationKind,
    pub table: String,
    pub columns: Vec<String>,
    pub values: Vec<Value>,
}

impl Mutation {
    pub fn new(kind: MutationKind, table: impl Into<String>, columns: Vec<String>, values: Vec<Value>) -> Self {
        Self {
            kind,
            table: table.into(),
            columns,
            values,
        }
    }

    pub fn insert(table: impl Into<String>, columns: Vec<String>, values: Vec<Value>) -> Self {
        Self::new(MutationKind::Insert, table, columns, values)
    }

    pub fn insert_or_update(
        table: impl Into<String>,
        columns: Vec<String>,
        values: Vec<Value>,
    ) -> Self {
        Self::new(MutationKind::InsertOrUpdate, table, columns, values)
    }
}

/// A SQL query with named parameters (`@name`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub sql: String,
    pub params: BTreeMap<String, Value>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }
}

/// Operations the tooling issues against one Spanner database.
///
/// Errors are raw gRPC statuses; classification and retry happen in the
/// callers.
#[tonic::async_trait]
pub trait SpannerClient: Send + Sync {
    /// Apply mutations atomically.
    async fn apply(&self, mutations: &[Mutation]) -> Result<(), Status>;

    /// Run a read-only query.
    async fn query(&self, statement: &Statement) -> Result<Vec<Row>, Status>;

    /// Apply DDL statements in order.
    async fn update_ddl(&self, statements: &[String]) -> Result<(), Status>;
}

/// Opens clients for fully-qualified database paths.
#[tonic::async_trait]
pub trait ClientFactory: Send + Sync {
    type Client: SpannerClient;

    /// Connect to `database_path` (`projects/…/instances/…/databases/…`)
    /// through the emulator at `emulator_host`.
    async fn connect(&self, emulator_host: &str, database_path: &str)
    -> Result<Self::Client, Status>;
}
