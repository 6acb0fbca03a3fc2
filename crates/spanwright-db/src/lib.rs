//! spanwright-db — database operations for Spanner E2E tooling.
//!
//! Every call goes through a retrying executor scoped by an [`OpContext`].
//! Seeding and validation helpers sit on top; the client itself is behind
//! the [`SpannerClient`] trait so tests run without an emulator.
//!
//! ```text
//! Config ──▶ open_client(factory) ──▶ SpannerClient
//!                                        │
//!   fixtures ─▶ build_inserts ─▶ apply_mutations ─┐
//!   schema   ─────────────────▶ apply_schema ─────┤─▶ with_retry ─▶ OpContext
//!   checks   ─▶ count_rows / expect_row_count ────┘    (3 attempts, linear)
//! ```

pub mod client;
pub mod context;
pub mod error;
pub mod ops;
pub mod retry;
pub mod seed;

pub use client::{ClientFactory, Mutation, MutationKind, Row, SpannerClient, Statement};
pub use context::OpContext;
pub use error::{DbError, DbResult};
pub use ops::{apply_mutations, apply_schema, count_rows, expect_row_count, open_client, query_rows};
pub use retry::{BASE_DELAY, MAX_ATTEMPTS, RetryPolicy, is_retryable, with_retry};
pub use seed::{FixtureRow, build_insert, build_inserts, resolve_table};
