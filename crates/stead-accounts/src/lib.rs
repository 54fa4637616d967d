//! User accounts for the stead backend.
//!
//! Implements the user model and its CRUD operations over a plain
//! `rusqlite::Connection`. Users own properties; deleting a user cascades to
//! their listings at the storage layer (see the schema in `stead-db`).
//!
//! `date_of_birth` is stored as `YYYY-MM-DD` text and validated as a real
//! calendar date on every write.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("user not found")]
    NotFound,
    #[error("date_of_birth must be YYYY-MM-DD")]
    InvalidDateOfBirth,
}

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Internal database ID.
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Date of birth in `YYYY-MM-DD` form.
    pub date_of_birth: Option<String>,
}

/// Parameters for creating a new user. All fields are required at creation;
/// the columns themselves stay nullable so a later update can clear them.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
}

/// A partial update to a user.
///
/// The outer `Option` is presence in the request; the inner `Option` is the
/// new column value, so `Some(None)` writes NULL.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub first_name: Option<Option<String>>,
    pub last_name: Option<Option<String>>,
    pub date_of_birth: Option<Option<String>>,
}

impl UserChanges {
    /// True when no field is present.
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.date_of_birth.is_none()
    }
}

/// Validates a `YYYY-MM-DD` string as a real calendar date.
pub fn validate_date_of_birth(value: &str) -> Result<(), AccountError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| AccountError::InvalidDateOfBirth)
}

/// Inserts a new user and returns its generated id.
pub fn create_user(conn: &Connection, user: &NewUser) -> Result<i64, AccountError> {
    validate_date_of_birth(&user.date_of_birth)?;

    conn.execute(
        "INSERT INTO users (first_name, last_name, date_of_birth) VALUES (?1, ?2, ?3)",
        params![user.first_name, user.last_name, user.date_of_birth],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Retrieves a user by id.
pub fn get_user(conn: &Connection, user_id: i64) -> Result<User, AccountError> {
    conn.query_row(
        "SELECT id, first_name, last_name, date_of_birth FROM users WHERE id = ?1",
        [user_id],
        map_row_to_user,
    )
    .optional()?
    .ok_or(AccountError::NotFound)
}

/// Lists all users ordered by id ascending.
pub fn list_users(conn: &Connection) -> Result<Vec<User>, AccountError> {
    let mut stmt = conn
        .prepare("SELECT id, first_name, last_name, date_of_birth FROM users ORDER BY id ASC")?;

    let rows = stmt.query_map([], map_row_to_user)?;
    let mut users = Vec::new();
    for row in rows {
        users.push(row?);
    }
    Ok(users)
}

/// Applies a partial update as a single UPDATE statement.
///
/// Only fields present in `changes` are written; the rest keep their prior
/// value. A present `date_of_birth` is re-validated unless it clears the
/// column.
pub fn update_user(
    conn: &Connection,
    user_id: i64,
    changes: &UserChanges,
) -> Result<(), AccountError> {
    if let Some(Some(dob)) = &changes.date_of_birth {
        validate_date_of_birth(dob)?;
    }

    let mut set_parts: Vec<String> = Vec::new();
    let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
    let mut idx = 1usize;

    if let Some(first_name) = &changes.first_name {
        set_parts.push(format!("first_name = ?{}", idx));
        values.push(Box::new(first_name.clone()));
        idx += 1;
    }
    if let Some(last_name) = &changes.last_name {
        set_parts.push(format!("last_name = ?{}", idx));
        values.push(Box::new(last_name.clone()));
        idx += 1;
    }
    if let Some(dob) = &changes.date_of_birth {
        set_parts.push(format!("date_of_birth = ?{}", idx));
        values.push(Box::new(dob.clone()));
        idx += 1;
    }

    if set_parts.is_empty() {
        // Nothing to write; report whether the user exists at all.
        let _ = get_user(conn, user_id)?;
        return Ok(());
    }

    let sql = format!("UPDATE users SET {} WHERE id = ?{}", set_parts.join(", "), idx);
    values.push(Box::new(user_id));

    let params: Vec<&dyn rusqlite::types::ToSql> = values.iter().map(|v| v.as_ref()).collect();
    let count = conn.execute(&sql, params.as_slice())?;
    if count == 0 {
        return Err(AccountError::NotFound);
    }
    Ok(())
}

fn map_row_to_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        date_of_birth: row.get(3)?,
    })
}
