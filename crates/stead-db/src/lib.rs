//! Database layer for the stead backend.
//!
//! Provides SQLite connection pooling (via `r2d2`) and the embedded schema
//! script. Handlers check a connection out of the pool once per request; the
//! pooled guard returns the connection on every exit path when it drops, and
//! a connection holding an uncommitted transaction rolls back on drop, so a
//! failed request never leaks a dirty transaction into the next checkout.
//!
//! # Design decisions
//!
//! - **SQLite with WAL mode**: a single-file store is all this service
//!   needs; WAL allows concurrent readers with a single writer.
//! - **`r2d2` connection pool**: bounded connection reuse without manual
//!   lifetime management.
//! - **Embedded schema**: the DDL script is compiled into the binary via
//!   `include_str!`, so the schema ships with the code that depends on it.

mod pool;
mod schema;

pub use pool::{create_pool, DbPool, DbRuntimeSettings, PoolError};
pub use schema::{reset_schema, SchemaError};
