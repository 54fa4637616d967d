//! Embedded schema script and destructive reset.
//!
//! The whole schema lives in one SQL file compiled into the binary. Unlike
//! an incremental migration chain, `reset_schema` drops and recreates both
//! tables; it is wired to the explicit `init-db` command and must never run
//! as part of request handling.

use rusqlite::Connection;
use thiserror::Error;

/// The full DDL script: drops and recreates `users` and `properties`.
const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Errors that can occur while resetting the schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A statement in the schema script failed.
    #[error("schema reset failed: {0}")]
    Execution(rusqlite::Error),
}

/// Drops and recreates the database schema inside a single transaction.
///
/// The transaction commits only after every statement in the script has
/// succeeded; a failure part-way through leaves the previous schema intact.
///
/// # Errors
///
/// Returns `SchemaError::Execution` if any statement fails.
pub fn reset_schema(conn: &Connection) -> Result<(), SchemaError> {
    reset_with_script(conn, SCHEMA_SQL)
}

fn reset_with_script(conn: &Connection, sql: &str) -> Result<(), SchemaError> {
    let tx = conn.unchecked_transaction().map_err(SchemaError::Execution)?;
    tx.execute_batch(sql).map_err(SchemaError::Execution)?;
    tx.commit().map_err(SchemaError::Execution)?;
    tracing::info!("database schema reset");
    Ok(())
}
